//! Database models, DTOs, and the shared list-query primitives.

pub mod customer;
pub mod employee;
pub mod filter;
pub mod goods_receipt;
pub mod pagination;
pub mod product;
pub mod sorting;
pub mod supplier;
pub mod warehouse;
