pub mod push;

pub use push::register_routes;
