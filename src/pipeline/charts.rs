//! Diagnostic chart rendering
//!
//! Charts draw geometry only, so rendering never depends on system fonts.

use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use plotters::prelude::*;

use crate::error::{Error, Result};
use crate::hierarchical::Hierarchy;

/// Renders the diagnostic images of a pipeline run
pub trait Renderer {
    /// Dendrogram of the full merge tree
    fn dendrogram(&self, tree: &Hierarchy<f64>, path: &Path) -> Result<()>;
    /// Scatter plot of (x, y) points colored by cluster label
    fn scatter(&self, points: &Array2<f64>, labels: &[usize], path: &Path) -> Result<()>;
}

/// PNG rendering with plotters' bitmap backend
pub struct PlottersRenderer {
    width: u32,
    height: u32,
}

impl PlottersRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        PlottersRenderer { width, height }
    }
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        PlottersRenderer::new(1000, 700)
    }
}

fn axis_range(values: ArrayView1<f64>) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max - min) * 0.05).max(1e-3);
    (min - pad, max + pad)
}

fn draw_scatter(
    points: &Array2<f64>,
    labels: &[usize],
    path: &Path,
    size: (u32, u32),
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = axis_range(points.column(0));
    let (y_min, y_max) = axis_range(points.column(1));

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.draw_series(points.rows().into_iter().zip(labels).map(|(point, label)| {
        Circle::new((point[0], point[1]), 3, Palette99::pick(*label).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_dendrogram(
    tree: &Hierarchy<f64>,
    path: &Path,
    size: (u32, u32),
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let n = tree.num_observations();
    let steps = tree.steps();

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let max_height = steps.iter().map(|s| s.dissimilarity).fold(0.0, f64::max);
    let top = if max_height > 0. { max_height * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(-1.0..n as f64, 0.0..top)?;

    // leaves ordered left to right by walking the tree from the root, so
    // merge links never cross
    let children = steps
        .iter()
        .enumerate()
        .map(|(k, step)| (n + k, (step.cluster1, step.cluster2)))
        .collect::<HashMap<_, _>>();
    let root_id = if steps.is_empty() { 0 } else { n + steps.len() - 1 };

    let mut order = Vec::with_capacity(n);
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if let Some(&(a, b)) = children.get(&id) {
            stack.push(b);
            stack.push(a);
        } else {
            order.push(id);
        }
    }

    // (x, height) per cluster id, leaves sit on the baseline
    let mut pos = order
        .iter()
        .enumerate()
        .map(|(rank, id)| (*id, (rank as f64, 0.0)))
        .collect::<HashMap<_, _>>();

    for (k, step) in steps.iter().enumerate() {
        let (xa, ya) = pos[&step.cluster1];
        let (xb, yb) = pos[&step.cluster2];
        let h = step.dissimilarity;

        chart.draw_series(std::iter::once(PathElement::new(
            vec![(xa, ya), (xa, h), (xb, h), (xb, yb)],
            BLACK.stroke_width(1),
        )))?;

        pos.insert(n + k, ((xa + xb) / 2.0, h));
    }

    root.present()?;
    Ok(())
}

impl PlottersRenderer {
    fn write_error(path: &Path, err: Box<dyn std::error::Error>) -> Error {
        Error::OutputWrite {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl Renderer for PlottersRenderer {
    fn dendrogram(&self, tree: &Hierarchy<f64>, path: &Path) -> Result<()> {
        draw_dendrogram(tree, path, (self.width, self.height))
            .map_err(|e| Self::write_error(path, e))
    }

    fn scatter(&self, points: &Array2<f64>, labels: &[usize], path: &Path) -> Result<()> {
        draw_scatter(points, labels, path, (self.width, self.height))
            .map_err(|e| Self::write_error(path, e))
    }
}
