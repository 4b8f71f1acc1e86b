// Copyright @yucwang 2021

pub mod bvh;
pub mod interaction;
mod intersector;
pub mod primitive;
pub mod scene;
pub mod shape;
pub mod tangent_frame;
