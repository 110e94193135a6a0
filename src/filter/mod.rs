pub mod basic;
pub mod model;
pub mod tree;

pub use basic::{
    BasicOperator, BasicRow, basic_rows_or_default, basic_rows_to_filter_group, default_basic_rows,
    filter_group_to_basic_rows, is_basic_compatible, is_basic_compatible_for,
};
pub use model::{Combinator, FilterCondition, FilterGroup};
