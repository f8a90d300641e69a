//! Layout of the per-vertex data the pipeline declares: positions in binding 0
//! and colors in binding 1, each in its own tightly packed buffer.

use std::mem::size_of;

use ash::vk::{
    Format, VertexInputAttributeDescription, VertexInputBindingDescription, VertexInputRate,
};

pub const POSITION_BINDING: u32 = 0;
pub const COLOR_BINDING: u32 = 1;

pub const POSITION_LOCATION: u32 = 0;
pub const COLOR_LOCATION: u32 = 1;

pub type Position = [f32; 2];
pub type Color = [f32; 3];

pub fn binding_descriptions() -> [VertexInputBindingDescription; 2] {
    [
        VertexInputBindingDescription {
            binding: POSITION_BINDING,
            stride: size_of::<Position>() as u32,
            input_rate: VertexInputRate::VERTEX,
        },
        VertexInputBindingDescription {
            binding: COLOR_BINDING,
            stride: size_of::<Color>() as u32,
            input_rate: VertexInputRate::VERTEX,
        },
    ]
}

pub fn attribute_descriptions() -> [VertexInputAttributeDescription; 2] {
    [
        VertexInputAttributeDescription {
            location: POSITION_LOCATION,
            binding: POSITION_BINDING,
            format: Format::R32G32_SFLOAT,
            offset: 0,
        },
        VertexInputAttributeDescription {
            location: COLOR_LOCATION,
            binding: COLOR_BINDING,
            format: Format::R32G32B32_SFLOAT,
            offset: 0,
        },
    ]
}
