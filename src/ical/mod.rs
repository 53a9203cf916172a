//! This module handles conversion from internal representations to iCal files

mod builder;
pub use builder::build_from;

use crate::config::{org_name, product_name};

pub fn default_prod_id() -> String {
    format!("-//{}//{}//EN", org_name(), product_name())
}
