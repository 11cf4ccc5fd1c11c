use crate::types::*;

/// Core geometry kernel trait. Provides all shape construction and modification operations.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (analytic test double).
///
/// Shapes are immutable: every operation returns a new handle.
pub trait Kernel {
    /// Build a wire from connected lines and arcs.
    fn make_wire(&mut self, segments: &[CurveSegment]) -> Result<WireHandle, KernelError>;

    /// Build a closed circular wire.
    fn make_circle(
        &mut self,
        center: Point3,
        normal: Vector3,
        radius: f64,
    ) -> Result<WireHandle, KernelError>;

    /// Build a planar face bounded by a closed wire.
    fn make_face(&mut self, wire: &WireHandle) -> Result<FaceHandle, KernelError>;

    /// Linear extrusion of a face along a vector.
    fn extrude(&mut self, face: &FaceHandle, vector: Vector3) -> Result<ShapeHandle, KernelError>;

    /// Axis-aligned box with its minimum corner at `origin`.
    fn make_box(&mut self, origin: Point3, size: Vector3) -> Result<ShapeHandle, KernelError>;

    /// Cylinder whose base circle is centred at `base_center`, extending along `axis`.
    fn make_cylinder(
        &mut self,
        base_center: Point3,
        axis: Vector3,
        radius: f64,
        height: f64,
    ) -> Result<ShapeHandle, KernelError>;

    /// Loft through the given section wires.
    fn make_loft(
        &mut self,
        sections: &[WireHandle],
        solid: bool,
        ruled: bool,
    ) -> Result<ShapeHandle, KernelError>;

    /// Sweep a closed profile along a path wire. The profile sits at the path's start.
    fn make_pipe(
        &mut self,
        path: &WireHandle,
        profile: &WireHandle,
    ) -> Result<ShapeHandle, KernelError>;

    /// Boolean union of two shapes.
    fn fuse(&mut self, a: &ShapeHandle, b: &ShapeHandle) -> Result<ShapeHandle, KernelError>;

    /// Boolean union of many shapes.
    fn multi_fuse(&mut self, shapes: &[ShapeHandle]) -> Result<ShapeHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn cut(&mut self, a: &ShapeHandle, b: &ShapeHandle) -> Result<ShapeHandle, KernelError>;

    /// Translated copy of a shape.
    fn translated(&mut self, shape: &ShapeHandle, vector: Vector3)
        -> Result<ShapeHandle, KernelError>;

    /// Rotated copy of a shape; `angle_deg` in degrees about the axis through `origin`.
    fn rotated(
        &mut self,
        shape: &ShapeHandle,
        origin: Point3,
        axis: Vector3,
        angle_deg: f64,
    ) -> Result<ShapeHandle, KernelError>;

    /// Fillet (round) the specified edges with the given radius.
    fn fillet(
        &mut self,
        shape: &ShapeHandle,
        radius: f64,
        edges: &[KernelId],
    ) -> Result<ShapeHandle, KernelError>;

    /// Merge coplanar faces left behind by booleans.
    fn remove_splitter(&mut self, shape: &ShapeHandle) -> Result<ShapeHandle, KernelError>;
}

/// Read-only queries on kernel shapes.
pub trait KernelIntrospect {
    /// List all edges of a shape.
    fn edges(&self, shape: &ShapeHandle) -> Result<Vec<EdgeInfo>, KernelError>;

    /// List all vertex positions of a shape.
    fn vertices(&self, shape: &ShapeHandle) -> Result<Vec<Point3>, KernelError>;

    /// Enclosed volume in mm³.
    fn volume(&self, shape: &ShapeHandle) -> Result<f64, KernelError>;

    /// Centre of gravity assuming uniform density.
    fn center_of_gravity(&self, shape: &ShapeHandle) -> Result<Point3, KernelError>;

    fn bounding_box(&self, shape: &ShapeHandle) -> Result<BoundingBox, KernelError>;
}
