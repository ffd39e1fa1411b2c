//! 门户页面的固定布局描述（选择器与固定表）

pub mod selectors;
