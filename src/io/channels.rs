//! Channel centreline reader.
//!
//! Loads channel (thalweg) polylines from a shapefile. Every part of every
//! polyline record becomes one [`Channel`].

use std::path::Path;

use shapefile::{Reader, Shape};
use thiserror::Error;

use crate::criteria::Channel;

/// Error type for channel file operations.
#[derive(Debug, Error)]
pub enum ChannelFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shapefile parsing error
    #[error("Shapefile error: {0}")]
    Shapefile(String),
}

impl From<shapefile::Error> for ChannelFileError {
    fn from(e: shapefile::Error) -> Self {
        ChannelFileError::Shapefile(e.to_string())
    }
}

/// Read channel centrelines from a polyline shapefile.
///
/// Non-polyline shapes are ignored; parts with fewer than one vertex are dropped.
pub fn read_channel_shapefile<P: AsRef<Path>>(path: P) -> Result<Vec<Channel>, ChannelFileError> {
    let mut reader = Reader::from_path(path)?;
    let mut channels = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, _record) = result?;

        match shape {
            Shape::Polyline(line) => {
                for part in line.parts() {
                    channels.push(Channel::new(part.iter().map(|p| (p.x, p.y)).collect()));
                }
            }
            Shape::PolylineZ(line) => {
                for part in line.parts() {
                    channels.push(Channel::new(part.iter().map(|p| (p.x, p.y)).collect()));
                }
            }
            _ => {}
        }
    }

    channels.retain(|c| !c.points.is_empty());
    log::info!("Loaded {} channel polylines", channels.len());
    Ok(channels)
}
