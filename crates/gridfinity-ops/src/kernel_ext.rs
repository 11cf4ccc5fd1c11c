use brep_kernel::{Kernel, KernelIntrospect};

/// Kernel access for feature builders: construction plus the queries
/// (edges, bounding boxes) they use to pick fillet targets on the same
/// kernel value.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

impl<K: Kernel + KernelIntrospect> KernelBundle for K {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}
