//! Hooks for fitting rate model parameters to observations.
//!
//! An optimiser works on a flat parameter vector. [`evaluate`] rebuilds the model
//! from that vector and returns its conditional rate for each input, so any
//! least-squares routine can drive it. No optimiser is provided here.

use crate::errors::GrowthMapResult;
use crate::rate_model::RateModel;

/// Conditional rate of `model` rebuilt with `params`, for each value in `xs`.
///
/// `xs` must already be in the model's input unit. Use [`crate::Layer::evaluate`]
/// for values in a layer's unit.
pub fn evaluate(model: &dyn RateModel, params: &[f64], xs: &[f64]) -> GrowthMapResult<Vec<f64>> {
    let model = model.with_parameters(params)?;
    Ok(xs.iter().map(|&x| model.conditional_rate(x)).collect())
}

/// `evaluate(model, params, xs) - ys`, element by element.
pub fn residuals(
    model: &dyn RateModel,
    params: &[f64],
    xs: &[f64],
    ys: &[f64],
) -> GrowthMapResult<Vec<f64>> {
    Ok(evaluate(model, params, xs)?
        .into_iter()
        .zip(ys)
        .map(|(fitted, observed)| fitted - observed)
        .collect())
}

/// The current parameter vector of `model`.
pub fn parameter_values(model: &dyn RateModel) -> Vec<f64> {
    model.parameters().into_iter().map(|p| p.value).collect()
}

/// Lower and upper bound vectors, in parameter order.
pub fn parameter_bounds(model: &dyn RateModel) -> (Vec<f64>, Vec<f64>) {
    model
        .parameters()
        .into_iter()
        .map(|p| p.bounds)
        .unzip()
}
