pub mod database;
pub mod mocks;
pub mod test_app;
