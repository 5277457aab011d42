//! Data source implementations

pub mod data_source_factory;

pub use data_source_factory::FactoryDataSource;
