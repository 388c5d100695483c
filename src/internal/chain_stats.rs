//! Fills chained maps with random keys across a sweep of load factors and charts how long the
//! bucket chains get.
#![allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]

use std::{error::Error, path::{Path, PathBuf}};

use chained_hash::{ChainStats, ChainedHashMap, TableConfig};
use clap::Parser;
use log::{debug, info};
use plotters::prelude::*;
use rand::{Rng, distr::Alphanumeric};

/// Number of load factors sampled between 0.1 and 1.0
const NUM_LOAD_FACTORS: usize = 10;

/// Font used for every label on the chart
const FONT_FAMILY: &str = "sans-serif";

/// Command line options
#[derive(Debug, Parser)]
#[command(about = "Charts bucket chain lengths of a chained hash map across load factors")]
struct Args {
    /// Number of random keys inserted per load factor
    #[arg(long, default_value_t = 50_000)]
    keys: usize,
    /// Initial bucket count of every map
    #[arg(long, default_value_t = 16)]
    capacity: usize,
    /// Length of each generated key
    #[arg(long, default_value_t = 8)]
    key_length: usize,
    /// Path of the PNG chart
    #[arg(long, default_value = "chain_lengths.png")]
    output: PathBuf,
}

/// Measurements for one load factor
#[derive(Debug, Clone, Copy)]
struct Sample {
    /// Load factor the map was configured with
    load_factor: f64,
    /// Occupancy once every key was inserted
    stats: ChainStats,
}

/// Generates `count` random alphanumeric keys of `length` characters
fn random_keys(count: usize, length: usize) -> Vec<String> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| (&mut rng).sample_iter(Alphanumeric).take(length).map(char::from).collect())
        .collect()
}

/// Inserts every key into a fresh map built with `load_factor`
fn measure(keys: &[String], capacity: usize, load_factor: f64) -> Result<Sample, Box<dyn Error>> {
    let config = TableConfig::new(capacity).with_load_factor(load_factor);
    let mut map = ChainedHashMap::with_config(config)?;
    for (index, key) in keys.iter().enumerate() {
        map.try_insert(key.clone(), index)?;
    }
    debug!("load factor {load_factor:.2}: {map_len} keys stored", map_len = map.len());
    Ok(Sample { load_factor, stats: map.stats() })
}

/// Draws mean and longest chain length against the load factor
fn draw_chart(path: &Path, samples: &[Sample]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_chain =
        samples.iter().map(|sample| sample.stats.longest_chain).max().unwrap_or(1) as f64 * 1.1;

    {
        let mut chart = ChartBuilder::on(&root)
            .caption("Bucket Chain Length by Load Factor", (FONT_FAMILY, 35))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..1.0_f64, 0.0..max_chain)?;

        chart
            .configure_mesh()
            .x_desc("Configured Load Factor")
            .y_desc("Keys per Occupied Bucket")
            .axis_desc_style((FONT_FAMILY, 16))
            .draw()?;

        let mean_color = RGBColor(50, 90, 220);
        let mean_style = ShapeStyle::from(&mean_color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(
                samples.iter().map(|sample| (sample.load_factor, sample.stats.mean_chain_length())),
                mean_style,
            ))?
            .label("Mean chain")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], mean_style));
        chart.draw_series(samples.iter().map(|sample| {
            Circle::new(
                (sample.load_factor, sample.stats.mean_chain_length()),
                4,
                mean_color.filled(),
            )
        }))?;

        let longest_color = RGBColor(220, 50, 50);
        let longest_style = ShapeStyle::from(&longest_color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(
                samples
                    .iter()
                    .map(|sample| (sample.load_factor, sample.stats.longest_chain as f64)),
                longest_style,
            ))?
            .label("Longest chain")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], longest_style));
        chart.draw_series(samples.iter().map(|sample| {
            Circle::new(
                (sample.load_factor, sample.stats.longest_chain as f64),
                4,
                longest_color.filled(),
            )
        }))?;

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().init();
    let args = Args::parse();

    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| 0.1 + 0.9 * i as f64 / (NUM_LOAD_FACTORS - 1) as f64)
        .collect();
    let keys = random_keys(args.keys, args.key_length);
    info!("generated {} keys of length {}", keys.len(), args.key_length);

    let mut samples = Vec::with_capacity(load_factors.len());
    for &load_factor in &load_factors {
        let sample = measure(&keys, args.capacity, load_factor)?;
        let stats = sample.stats;
        println!(
            "load factor {load_factor:.2}: capacity = {}, resizes = {}, mean chain = {:.3}, longest chain = {}",
            stats.capacity,
            stats.resizes,
            stats.mean_chain_length(),
            stats.longest_chain
        );
        samples.push(sample);
    }

    draw_chart(&args.output, &samples)?;
    info!("wrote {}", args.output.display());
    Ok(())
}
