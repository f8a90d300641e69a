use std::{
    fs::File,
    io::{self, BufReader},
    ops::Deref,
    path::Path,
    rc::Rc,
};

use ash::{
    util::read_spv,
    vk::{self, ShaderModuleCreateInfo},
};
use tracing::debug;

use crate::{
    config::ValidationPolicy,
    error::{Error, Result},
    LogicalDevice,
};

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Reads a pre-compiled SPIR-V blob into words. A missing file is reported
/// separately from other read failures.
pub fn load_shader_code(path: &Path, validation: ValidationPolicy) -> Result<Vec<u32>> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::ShaderNotFound {
            path: path.to_owned(),
            source,
        },
        _ => Error::ShaderRead {
            path: path.to_owned(),
            source,
        },
    })?;
    let code = read_spv(&mut BufReader::new(file)).map_err(|source| Error::ShaderRead {
        path: path.to_owned(),
        source,
    })?;

    validation.check(|| match code.first() {
        Some(&SPIRV_MAGIC) => Ok(()),
        _ => Err(Error::InvalidShader {
            path: path.to_owned(),
        }),
    })?;
    debug!("Loaded {} ({} words)", path.display(), code.len());
    Ok(code)
}

pub struct ShaderModule {
    shader_module: vk::ShaderModule,
    logical_device: Rc<LogicalDevice>,
}

impl ShaderModule {
    pub fn load(
        logical_device: &Rc<LogicalDevice>,
        path: &Path,
        validation: ValidationPolicy,
    ) -> Result<Self> {
        let code = load_shader_code(path, validation)?;
        Self::new(logical_device, &code)
    }

    pub fn new(logical_device: &Rc<LogicalDevice>, code: &[u32]) -> Result<Self> {
        let create_info = ShaderModuleCreateInfo::builder().code(code);
        let shader_module = unsafe { logical_device.create_shader_module(&create_info, None) }
            .map_err(Error::ShaderModuleCreation)?;
        Ok(Self {
            shader_module,
            logical_device: Rc::clone(logical_device),
        })
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.logical_device
                .destroy_shader_module(self.shader_module, None)
        }
    }
}

impl Deref for ShaderModule {
    type Target = vk::ShaderModule;

    fn deref(&self) -> &Self::Target {
        &self.shader_module
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use tempfile::{tempdir, NamedTempFile};

    use super::*;
    use crate::error::ErrorKind;

    fn spirv_file(words: &[u32]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for word in words {
            file.write_all(&word.to_le_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn missing_shader_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vert.spv");
        let err = load_shader_code(&path, ValidationPolicy::enabled()).unwrap_err();
        assert!(matches!(err, Error::ShaderNotFound { .. }), "{err}");
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("vert.spv"));
    }

    #[test]
    fn reads_words_in_order() {
        let words = [SPIRV_MAGIC, 0x0001_0000, 0, 7, 0];
        let file = spirv_file(&words);
        let code = load_shader_code(file.path(), ValidationPolicy::enabled()).unwrap();
        assert_eq!(code, words);
    }

    #[test]
    fn truncated_file_is_a_read_error() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), [0x03, 0x02, 0x23, 0x07, 0x00, 0x00]).unwrap();
        let err = load_shader_code(file.path(), ValidationPolicy::disabled()).unwrap_err();
        assert!(matches!(err, Error::ShaderRead { .. }), "{err}");
    }

    #[test]
    fn wrong_magic_is_rejected_only_when_checking() {
        let file = spirv_file(&[0xdead_beef, 1, 2]);
        let err = load_shader_code(file.path(), ValidationPolicy::enabled()).unwrap_err();
        assert!(matches!(err, Error::InvalidShader { .. }));
        assert_eq!(err.kind(), ErrorKind::Precondition);

        let code = load_shader_code(file.path(), ValidationPolicy::disabled()).unwrap();
        assert_eq!(code.len(), 3);
    }

    #[test]
    fn empty_file_is_not_spirv() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            load_shader_code(file.path(), ValidationPolicy::enabled()),
            Err(Error::InvalidShader { .. })
        ));
    }
}
