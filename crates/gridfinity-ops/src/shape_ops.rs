use brep_kernel::{Kernel, ShapeHandle, Vector3};

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Translated copies of `shape`, one per vector, fused into one solid.
///
/// The original is not part of the result unless a zero vector is given.
pub fn copy_and_translate(
    kb: &mut dyn KernelBundle,
    shape: &ShapeHandle,
    vectors: &[Vector3],
) -> Result<ShapeHandle, OpError> {
    if vectors.is_empty() {
        return Err(OpError::EmptyVectorList);
    }
    let copies = vectors
        .iter()
        .map(|v| kb.translated(shape, *v))
        .collect::<Result<Vec<_>, _>>()?;
    multi_fuse(kb, &copies)
}

/// Union of all shapes. A single shape is returned unchanged.
pub fn multi_fuse(
    kb: &mut dyn KernelBundle,
    shapes: &[ShapeHandle],
) -> Result<ShapeHandle, OpError> {
    match shapes {
        [] => Err(OpError::EmptyShapeList),
        [only] => Ok(*only),
        _ => Ok(kb.multi_fuse(shapes)?),
    }
}

/// Fuse `b` into `a` when present.
pub fn fuse_optional(
    kb: &mut dyn KernelBundle,
    a: ShapeHandle,
    b: Option<ShapeHandle>,
) -> Result<ShapeHandle, OpError> {
    match b {
        Some(b) => Ok(kb.fuse(&a, &b)?),
        None => Ok(a),
    }
}

/// Cut `b` from `a` when present.
pub fn cut_optional(
    kb: &mut dyn KernelBundle,
    a: ShapeHandle,
    b: Option<ShapeHandle>,
) -> Result<ShapeHandle, OpError> {
    match b {
        Some(b) => Ok(kb.cut(&a, &b)?),
        None => Ok(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::{KernelIntrospect, MockKernel};

    #[test]
    fn copies_land_on_each_vector() {
        let mut k = MockKernel::new();
        let b = k.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let out = copy_and_translate(&mut k, &b, &[[10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]).unwrap();
        assert_relative_eq!(k.volume(&out).unwrap(), 2.0, epsilon = 1e-12);
        let bb = k.bounding_box(&out).unwrap();
        assert_relative_eq!(bb.min[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max[0], 21.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_inputs_are_errors() {
        let mut k = MockKernel::new();
        let b = k.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            copy_and_translate(&mut k, &b, &[]),
            Err(OpError::EmptyVectorList)
        ));
        assert!(matches!(multi_fuse(&mut k, &[]), Err(OpError::EmptyShapeList)));
    }

    #[test]
    fn single_shape_fuse_is_identity() {
        let mut k = MockKernel::new();
        let b = k.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        assert_eq!(multi_fuse(&mut k, &[b]).unwrap(), b);
        assert_eq!(k.call_count("multi_fuse"), 0);
    }
}
