#[macro_export]
macro_rules! arc_str {
    ($x:expr) => {
        $crate::utils::ArcStr::from($x)
    };
}

#[macro_export]
macro_rules! resource_key {
    ($($arg:tt)*) => {
        $crate::sync::ResourceKey::from(format!($($arg)*))
    };
}
