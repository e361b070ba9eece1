//! HTTP route handlers.

pub mod auth;
pub mod dashboard;
pub mod database;
pub mod health;
pub mod organizations;
pub mod projects;

pub use auth::{CallbackParams, callback_handler, login_handler, logout_handler};
pub use dashboard::dashboard_handler;
pub use database::{QueryRequest, QueryResponse, pitr_status_handler, run_query_handler};
pub use health::health_routes;
pub use organizations::list_organizations_handler;
pub use projects::{
    CreateProjectRequest, CreateProjectResponse, LocalProject, ProjectsResponse,
    create_project_handler, list_projects_handler,
};
