pub mod model;
pub mod repository;

pub use model::Car;
pub use repository::CarRepository;
