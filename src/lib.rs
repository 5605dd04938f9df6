//---------------------------------------
pub mod web_api {
    pub mod routes;
    pub mod controllers;
    pub mod error;
    pub mod views;
}

pub use web_api::routes::map_routes;
pub use web_api::controllers::*;
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod models;
    pub mod dto;
}

pub use shared::models::*;
pub use shared::dto::*;
//---------------------------------------

//---------------------------------------
pub mod data_access {
    pub mod query;
    pub mod task_store;
    pub mod data_context;
    pub mod memory_store;
    pub mod task_repository;
}
//---------------------------------------

//---------------------------------------
pub mod reporting {
    pub mod error_reporter;
}
//---------------------------------------
