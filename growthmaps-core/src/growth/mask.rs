use crate::stack::Stack;
use ndarray::{Array2, Zip};

/// Multiplicative validity mask for `stack`.
///
/// A cell is valid when every layer of the stack holds a value that is neither NaN
/// nor the layer's missing-value sentinel. Valid cells are 1, invalid cells NaN, so
/// multiplying an output slice by the mask forces missing cells to NaN and leaves the
/// rest untouched.
pub(crate) fn validity_mask(
    stack: &Stack,
    missing_value: impl Fn(&str) -> Option<f64>,
) -> Array2<f64> {
    let mut mask = Array2::from_elem(stack.shape().unwrap_or((0, 0)), 1.0);
    for (key, layer) in stack.iter() {
        let sentinel = missing_value(key);
        Zip::from(&mut mask).and(layer).for_each(|m, &v| {
            if v.is_nan() || sentinel == Some(v) {
                *m = f64::NAN;
            }
        });
    }
    mask
}
