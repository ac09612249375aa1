use super::*;
use crate::growth::{mapgrowth, mapgrowth_set, GrowthMapBuilder};
use crate::model::{Model, ModelSet};
use approx::assert_relative_eq;
use is_close::is_close;

#[test]
fn monthly_means() {
    let raster = mapgrowth(cold_stress(), &series(), monthly(4), 0.0).unwrap();

    assert_eq!(raster.shape(), (1, 2));
    assert_eq!(raster.times(), &[ts(1, 3), ts(2, 3), ts(3, 3), ts(4, 3)]);
    assert_eq!(raster.counts(), &[1, 2, 2, 2]);

    let expected = [[-4.0, -3.0], [-2.5, -1.5], [-0.5, 0.0], [0.0, 0.0]];
    for (p, values) in expected.iter().enumerate() {
        let slice = raster.period(p).unwrap();
        for (col, value) in values.iter().enumerate() {
            assert_relative_eq!(slice[[0, col]], *value);
        }
    }
    assert!(raster.period(4).is_none());
}

#[test]
fn snapshot_on_period_end_starts_the_next_period() {
    // Extending the span by one period picks up the snapshot on 3 May
    let raster = mapgrowth(cold_stress(), &series(), monthly(5), 0.0).unwrap();
    assert_eq!(raster.counts(), &[1, 2, 2, 2, 1]);
    assert_relative_eq!(raster.at(ts(5, 3)).unwrap()[[0, 0]], -105.0);
}

#[test]
fn empty_period_is_mask_only() {
    let source = MemorySource::new([
        (ts(1, 16), tas(array![[1.0, f64::NAN]])),
        (ts(3, 10), tas(array![[4.0, 4.0]])),
    ]);
    let warnings = Warnings::default();
    let raster = warnings
        .capture(|| mapgrowth(cold_stress(), &source, monthly(3), 0.0))
        .unwrap();

    assert_eq!(raster.counts(), &[1, 0, 1]);
    let february = raster.period(1).unwrap();
    assert_eq!(february[[0, 0]], 0.0);
    assert!(february[[0, 1]].is_nan());

    let events = warnings.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].contains("period=1 "));
    assert!(events[0].contains("start=2016-02-03 00:00:00"));
    assert!(events[0].contains("No input timesteps"));
}

#[test]
fn missing_value_in_a_later_timestep_masks_its_period() {
    let source = MemorySource::new([
        (ts(1, 16), tas(array![[1.0, 2.0]])),
        (ts(1, 20), tas(array![[1.0, -9999.0]])),
        (ts(2, 10), tas(array![[2.0, 3.0]])),
        (ts(2, 20), tas(array![[f64::NAN, 3.0]])),
        (ts(3, 10), tas(array![[4.0, 4.0]])),
    ])
    .with_missing_value("tas", -9999.0);
    let raster = mapgrowth(cold_stress(), &source, monthly(3), 0.0).unwrap();

    assert_eq!(raster.counts(), &[2, 2, 1]);
    let january = raster.period(0).unwrap();
    assert_eq!(january[[0, 0]], -4.0);
    assert!(january[[0, 1]].is_nan());
    // NaN is never treated as an inactive stress
    let february = raster.period(1).unwrap();
    assert!(february[[0, 0]].is_nan());
    assert_eq!(february[[0, 1]], -2.0);
    // Later periods are unaffected
    assert_eq!(raster.period(2).unwrap(), array![[-1.0, -1.0]]);
}

#[test]
fn invalid_cells_are_nan_in_every_period() {
    let source = MemorySource::new([
        (ts(1, 16), tas(array![[1.0, -9999.0]])),
        (ts(2, 10), tas(array![[2.0, 3.0]])),
    ])
    .with_missing_value("tas", -9999.0);
    let raster = mapgrowth(cold_stress(), &source, monthly(2), 0.0).unwrap();

    for p in 0..2 {
        let slice = raster.period(p).unwrap();
        assert!(slice[[0, 0]].is_finite());
        assert!(slice[[0, 1]].is_nan());
    }
    assert_relative_eq!(raster.period(1).unwrap()[[0, 0]], -3.0);
}

#[test]
fn initial_value_is_included_in_the_mean() {
    let raster = mapgrowth(cold_stress(), &series(), monthly(2), 1.0).unwrap();
    // (1 - 4) / 1 and (1 - 3 - 2) / 2
    assert_relative_eq!(raster.period(0).unwrap()[[0, 0]], -3.0);
    assert_relative_eq!(raster.period(1).unwrap()[[0, 0]], -2.0);
}

#[test]
fn models_share_one_data_load() {
    let source = MemorySource::new([
        (
            ts(1, 16),
            Stack::from_layers([
                ("tas", array![[1.0, 6.0]]),
                ("swc", array![[0.5, 0.25]]),
            ])
            .unwrap(),
        ),
        (
            ts(1, 20),
            Stack::from_layers([
                ("tas", array![[3.0, 6.0]]),
                ("swc", array![[1.5, 0.25]]),
                ("unused", array![[f64::NAN, f64::NAN]]),
            ])
            .unwrap(),
        ),
    ]);

    let mut models = ModelSet::new();
    models.insert("cold", cold_stress()).unwrap();
    models.insert("wet", moisture_growth()).unwrap();
    models
        .insert("both", vec![cold_stress(), moisture_growth()])
        .unwrap();

    let maps = mapgrowth_set(models, &source, monthly(1), 0.0).unwrap();
    assert_eq!(
        maps.iter().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["cold", "wet", "both"]
    );

    let cold = maps.get("cold").unwrap().period(0).unwrap().to_owned();
    let wet = maps.get("wet").unwrap().period(0).unwrap().to_owned();
    let both = maps.get("both").unwrap().period(0).unwrap().to_owned();

    // The unused NaN layer is never read, so it does not mask anything
    assert_eq!(cold, array![[-3.0, 0.0]]);
    assert_eq!(wet, array![[2.0, 0.5]]);
    for (sum, total) in (&cold + &wet).iter().zip(both.iter()) {
        assert!(is_close!(*sum, *total));
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let mut builder = GrowthMapBuilder::new();
    builder
        .with_model("cold", Model::from(cold_stress()))
        .with_timespan(monthly(4));
    let runner = builder.build().unwrap();

    let first = runner.run(&series()).unwrap();
    let second = runner.run(&series()).unwrap();
    let parallel = builder.with_threads(2).build().unwrap().run(&series()).unwrap();

    let bits = |maps: &crate::growth::GrowthMaps| -> Vec<u64> {
        maps.get("cold")
            .unwrap()
            .data()
            .iter()
            .map(|v| v.to_bits())
            .collect()
    };
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(bits(&first), bits(&parallel));
}

#[test]
fn required_keys_are_the_union() {
    let mut builder = GrowthMapBuilder::new();
    builder
        .with_model("cold", cold_stress())
        .with_model("both", vec![moisture_growth(), cold_stress()])
        .with_timespan(monthly(1));
    assert_eq!(builder.build().unwrap().required_keys(), vec!["tas", "swc"]);
}
