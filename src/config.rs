//! Parameter file parsing: a `nom`-based line-oriented key-value grammar.
//! Lines beginning with `%` are comments; each recognised line matches
//! `<Key>: <Value>`. Unknown keys are ignored with a warning, not an error.
#![allow(dead_code)]

use std::str::FromStr;

use nom::{
    bytes::complete::take_until,
    character::complete::{char, multispace0},
    combinator::rest,
    number::complete::float,
    sequence::{delimited, separated_pair, terminated},
    IResult,
};

use crate::error::ConfigError;

/// Which raster the driver should sweep, selected by the parameter file's
/// `scan type` key.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanType {
    Rectangular,
    Rotations,
    SinglePixel,
    Line,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SourceKind {
    Uniform,
    Gaussian,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScatteringKind {
    Specular,
    Cosine,
    Uniform,
    Broadened,
    Mixed,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SampleType {
    Flat,
    Sphere,
    Custom,
    PhotoStereo,
}

/// A fully-parsed, typed parameter set. Fields correspond 1:1 to the
/// parameter file's key list, rather than being looked up by string at
/// use sites.
#[derive(Debug, Clone)]
pub struct Config {
    pub working_distance: f32,
    pub incidence_angle: f32,
    pub scan_type: ScanType,
    pub detector_full_axes: Vec<(f32, f32)>,
    pub detector_centres: Vec<(f32, f32)>,
    pub rotation_angles: Vec<f32>,
    pub pinhole_radius: f32,
    pub ray_count: u32,
    pub source_model: SourceKind,
    pub angular_source_size: f32,
    pub source_stddev: f32,
    pub effuse_beam: bool,
    pub effuse_relative_size: f32,
    pub sample_type: SampleType,
    pub scattering: ScatteringKind,
    pub reflectivity: f32,
    pub scattering_stddev: f32,
    pub sphere_radius: Option<f32>,
    pub flat_side_length: f32,
    pub pixel_separation: f32,
    pub scan_range_x: f32,
    pub scan_range_y: f32,
    pub ignore_incidence_angle: bool,
    pub max_scatter: u32,
    pub plate_represent: bool,
    pub output_label: String,
    pub seed: u64,
}

/// Parses a single `<Key>: <Value>` line, trimming surrounding whitespace
/// from both halves. Returns `None` for blank lines and `%`-comments,
/// which are not errors.
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('%') {
        return None;
    }
    split_key_value(line).ok().map(|(_, (k, v))| {
        (
            k.trim().to_ascii_lowercase(),
            v.trim().to_string(),
        )
    })
}

fn split_key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_until(":"), char(':'), rest)(input)
}

/// Parses a `(a, b)` pair of floats, the format used for detector full
/// axes / centres in the parameter file.
fn parse_pair(input: &str) -> IResult<&str, (f32, f32)> {
    delimited(
        terminated(char('('), multispace0),
        separated_pair(
            delimited(multispace0, float, multispace0),
            char(','),
            delimited(multispace0, float, multispace0),
        ),
        char(')'),
    )(input)
}

fn parse_pair_value(key: &str, value: &str) -> Result<(f32, f32), ConfigError> {
    parse_pair(value)
        .map(|(_, pair)| pair)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_float_value(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.trim().parse::<f32>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_int_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool_on_off(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parses the full parameter-file text into a validated [`Config`].
///
/// Builds a fresh [`ConfigBuilder`], folds every recognised line into it,
/// logging and skipping unrecognised keys, then finalises with a check for
/// missing required keys and cross-field contradictions.
pub fn parse(text: &str) -> Result<Config, ConfigError> {
    let mut builder = ConfigBuilder::default();

    for line in text.lines() {
        let (key, value) = match parse_line(line) {
            Some(kv) => kv,
            None => continue,
        };
        if !builder.apply(&key, &value)? {
            log::warn!("unrecognised parameter key: {}", key);
        }
    }

    builder.finish()
}

#[derive(Default)]
struct ConfigBuilder {
    working_distance: Option<f32>,
    incidence_angle: Option<f32>,
    scan_type: Option<ScanType>,
    detector_full_axes: Vec<(f32, f32)>,
    detector_centres: Vec<(f32, f32)>,
    rotation_angles: Vec<f32>,
    pinhole_radius: Option<f32>,
    ray_count: Option<u32>,
    source_model: Option<SourceKind>,
    angular_source_size: Option<f32>,
    source_stddev: Option<f32>,
    effuse_beam: bool,
    effuse_relative_size: f32,
    sample_type: Option<SampleType>,
    scattering: Option<ScatteringKind>,
    reflectivity: Option<f32>,
    scattering_stddev: f32,
    sphere_radius: Option<f32>,
    flat_side_length: Option<f32>,
    pixel_separation: Option<f32>,
    scan_range_x: Option<f32>,
    scan_range_y: Option<f32>,
    ignore_incidence_angle: bool,
    max_scatter: Option<u32>,
    plate_represent: bool,
    output_label: Option<String>,
    seed: Option<u64>,
}

impl ConfigBuilder {
    /// Applies one `(key, value)` pair. Returns `Ok(true)` if the key was
    /// recognised, `Ok(false)` if unknown (caller logs a warning),
    /// `Err` on a recognised-but-malformed value.
    fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "working distance" => self.working_distance = Some(parse_float_value(key, value)?),
            "incidence angle" => self.incidence_angle = Some(parse_float_value(key, value)?),
            "scan type" => {
                self.scan_type = Some(match value.trim().to_ascii_lowercase().as_str() {
                    "rectangular" => ScanType::Rectangular,
                    "rotations" => ScanType::Rotations,
                    "single pixel" => ScanType::SinglePixel,
                    "line" => ScanType::Line,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })
                    }
                })
            }
            "detector full axes" => self.detector_full_axes.push(parse_pair_value(key, value)?),
            "detector centres" => self.detector_centres.push(parse_pair_value(key, value)?),
            "rotation angles" => {
                for part in value.split(',') {
                    self.rotation_angles.push(parse_float_value(key, part)?);
                }
            }
            "ray count" => self.ray_count = Some(parse_int_value(key, value)?),
            "pinhole radius" => self.pinhole_radius = Some(parse_float_value(key, value)?),
            "source model" => {
                self.source_model = Some(match value.trim().to_ascii_lowercase().as_str() {
                    "uniform" => SourceKind::Uniform,
                    "gaussian" => SourceKind::Gaussian,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })
                    }
                })
            }
            "angular source size" => self.angular_source_size = Some(parse_float_value(key, value)?),
            "source stddev" => self.source_stddev = Some(parse_float_value(key, value)?),
            "effuse beam" => self.effuse_beam = parse_bool_on_off(key, value)?,
            "effuse relative size" => self.effuse_relative_size = parse_float_value(key, value)?,
            "sample type" => {
                self.sample_type = Some(match value.trim().to_ascii_lowercase().as_str() {
                    "flat" => SampleType::Flat,
                    "sphere" => SampleType::Sphere,
                    "custom" => SampleType::Custom,
                    "photostereo" => SampleType::PhotoStereo,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })
                    }
                })
            }
            "scattering" => {
                self.scattering = Some(match value.trim().to_ascii_lowercase().as_str() {
                    "specular" => ScatteringKind::Specular,
                    "cosine" => ScatteringKind::Cosine,
                    "uniform" => ScatteringKind::Uniform,
                    "broadened" => ScatteringKind::Broadened,
                    "mixed" => ScatteringKind::Mixed,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })
                    }
                })
            }
            "reflectivity" => self.reflectivity = Some(parse_float_value(key, value)?),
            "scattering stddev" => self.scattering_stddev = parse_float_value(key, value)?,
            "sphere radius" => self.sphere_radius = Some(parse_float_value(key, value)?),
            "flat side length" => self.flat_side_length = Some(parse_float_value(key, value)?),
            "pixel separation" => self.pixel_separation = Some(parse_float_value(key, value)?),
            "scan range x" => self.scan_range_x = Some(parse_float_value(key, value)?),
            "scan range y" => self.scan_range_y = Some(parse_float_value(key, value)?),
            "ignore incidence angle" => self.ignore_incidence_angle = parse_bool_on_off(key, value)?,
            "max scatter" => self.max_scatter = Some(parse_int_value(key, value)?),
            "plate represent" => self.plate_represent = parse_bool_on_off(key, value)?,
            "output label" => self.output_label = Some(value.trim().to_string()),
            "seed" => self.seed = Some(parse_int_value(key, value)?),
            // Recognised-but-not-yet-core keys: detector count is derivable
            // from the aperture lists above; STL pinhole model, custom stl
            // path, sample description, sample working distance, manual
            // alignment, and recompile flag select or drive external
            // mesh-ingestion/plotting collaborators and carry no weight
            // inside this crate's typed `Config`.
            "detector count" | "stl pinhole model" | "sample description" | "sample working distance"
            | "custom stl path" | "manual alignment" | "recompile flag" => {}
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self) -> Result<Config, ConfigError> {
        let scan_type = self.scan_type.ok_or(ConfigError::MissingKey("scan type"))?;
        let sample_type = self.sample_type.unwrap_or(SampleType::Flat);

        if sample_type == SampleType::Sphere && self.sphere_radius.is_none() {
            return Err(ConfigError::Contradictory(
                "sample type 'sphere' requires 'sphere radius'".to_string(),
            ));
        }
        if self.detector_full_axes.is_empty() {
            return Err(ConfigError::MissingKey("detector full axes"));
        }
        if self.detector_centres.len() != self.detector_full_axes.len() {
            return Err(ConfigError::Contradictory(
                "detector centres and detector full axes counts differ".to_string(),
            ));
        }
        if scan_type == ScanType::Rotations && self.rotation_angles.is_empty() {
            return Err(ConfigError::Contradictory(
                "scan type 'rotations' requires at least one rotation angle".to_string(),
            ));
        }

        Ok(Config {
            working_distance: self.working_distance.ok_or(ConfigError::MissingKey("working distance"))?,
            incidence_angle: self.incidence_angle.ok_or(ConfigError::MissingKey("incidence angle"))?,
            scan_type,
            detector_full_axes: self.detector_full_axes,
            detector_centres: self.detector_centres,
            rotation_angles: self.rotation_angles,
            pinhole_radius: self.pinhole_radius.ok_or(ConfigError::MissingKey("pinhole radius"))?,
            ray_count: self.ray_count.ok_or(ConfigError::MissingKey("ray count"))?,
            source_model: self.source_model.unwrap_or(SourceKind::Uniform),
            angular_source_size: self.angular_source_size.unwrap_or(0.0),
            source_stddev: self.source_stddev.unwrap_or(0.0),
            effuse_beam: self.effuse_beam,
            effuse_relative_size: self.effuse_relative_size,
            sample_type,
            scattering: self.scattering.ok_or(ConfigError::MissingKey("scattering"))?,
            reflectivity: self.reflectivity.unwrap_or(1.0),
            scattering_stddev: self.scattering_stddev,
            sphere_radius: self.sphere_radius,
            flat_side_length: self.flat_side_length.unwrap_or(10.0),
            pixel_separation: self.pixel_separation.ok_or(ConfigError::MissingKey("pixel separation"))?,
            scan_range_x: self.scan_range_x.unwrap_or(0.0),
            scan_range_y: self.scan_range_y.unwrap_or(0.0),
            ignore_incidence_angle: self.ignore_incidence_angle,
            max_scatter: self.max_scatter.unwrap_or(20),
            plate_represent: self.plate_represent,
            output_label: self.output_label.unwrap_or_else(|| "shem-trace".to_string()),
            seed: self.seed.unwrap_or(0),
        })
    }
}
