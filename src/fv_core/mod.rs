pub mod condition;
pub mod field;
pub mod flux;
pub mod initial;
pub mod mesh;
pub mod physics;
pub mod quadrature;
pub mod reconstruction;
