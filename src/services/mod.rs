//! Business logic services.

pub mod auth;
pub mod customer;
pub mod employee;
pub mod goods_receipt;
pub mod product;
pub mod supplier;
pub mod warehouse;
