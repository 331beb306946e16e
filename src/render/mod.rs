pub(crate) mod backend;
pub(crate) mod capabilities;
pub(crate) mod context;
pub(crate) mod cpu;
pub(crate) mod cpu_filter;
pub(crate) mod scratch;
pub(crate) mod surface;
