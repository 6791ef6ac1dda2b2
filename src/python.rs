//! Python bindings

use crate::options::RenderOptions;
use crate::stream::{render_emf_to_svg, render_records_to_svg};
use pyo3::prelude::*;
use std::fs;
use std::path::Path;

/// Render the EMF+ content of an EMF file to an SVG file
///
/// Args:
///     input_path: Path to input EMF file
///     output_path: Path to output SVG file
///
/// Returns:
///     True if conversion successful
#[pyfunction]
fn convert_emfplus_to_svg(input_path: &str, output_path: &str) -> PyResult<bool> {
    let input = Path::new(input_path);
    if !input.exists() {
        return Err(PyErr::new::<pyo3::exceptions::PyFileNotFoundError, _>(format!(
            "Input file not found: {}",
            input_path
        )));
    }
    let data = fs::read(input).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("Failed to read input file: {}", e))
    })?;
    let svg = render_emf_to_svg(&data, &RenderOptions::default())?;
    fs::write(output_path, svg).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("Failed to write output file: {}", e))
    })?;
    Ok(true)
}

/// Render the EMF+ content of EMF bytes to an SVG string
///
/// Args:
///     data: EMF data as bytes
///     options_json: Optional JSON object with render options
#[pyfunction]
#[pyo3(signature = (data, options_json = None))]
fn convert_emfplus_bytes_to_svg(data: &[u8], options_json: Option<&str>) -> PyResult<String> {
    let options = match options_json {
        Some(json) => RenderOptions::from_json(json)?,
        None => RenderOptions::default(),
    };
    Ok(render_emf_to_svg(data, &options)?)
}

/// Render a bare EMF+ record buffer to an SVG string of the given size
#[pyfunction]
fn convert_emfplus_records_to_svg(records: &[u8], width: u32, height: u32) -> PyResult<String> {
    let options = RenderOptions {
        width,
        height,
        ..RenderOptions::default()
    };
    Ok(render_records_to_svg(records, &options)?)
}

/// Python module definition
#[pymodule]
fn emfplus_decoder(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(convert_emfplus_to_svg, m)?)?;
    m.add_function(wrap_pyfunction!(convert_emfplus_bytes_to_svg, m)?)?;
    m.add_function(wrap_pyfunction!(convert_emfplus_records_to_svg, m)?)?;
    Ok(())
}
