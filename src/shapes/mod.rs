// Copyright @yucwang 2021

pub mod capsule;
pub mod disk;
pub mod plane;
pub mod sphere;
pub mod triangle;
pub mod triangle_mesh;
