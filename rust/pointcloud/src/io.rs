// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLY reading and writing.
//!
//! Reading accepts ASCII and binary PLY with `x y z` vertices and optional
//! `red green blue`. Writing always produces ASCII with float positions and
//! `uchar` colors.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ply_rs::ply::Property;
use roomshell_core::{ColoredPoint, PointCloud, Rgb};

use crate::error::{PointCloudError, Result};

/// Loads the vertices of a PLY file.
///
/// Points without a color are tagged [`Rgb::SEGMENTED`].
pub fn read_ply(path: impl AsRef<Path>) -> Result<PointCloud> {
    use ply_rs::parser::Parser;

    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PointCloudError::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<ply_rs::ply::DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| PointCloudError::Parse {
            path: path.to_path_buf(),
            details: format!("PLY parse error: {:?}", e),
        })?;

    let Some(vertices) = ply.payload.get("vertex") else {
        return Err(PointCloudError::Parse {
            path: path.to_path_buf(),
            details: "no vertex element".to_string(),
        });
    };

    let missing = |name: &str| PointCloudError::Parse {
        path: path.to_path_buf(),
        details: format!("missing or invalid vertex property {name}"),
    };

    let mut cloud = PointCloud::with_capacity(vertices.len());
    for vertex in vertices {
        let x = ply_float(vertex.get("x")).ok_or_else(|| missing("x"))?;
        let y = ply_float(vertex.get("y")).ok_or_else(|| missing("y"))?;
        let z = ply_float(vertex.get("z")).ok_or_else(|| missing("z"))?;

        let color = match (
            ply_u8(vertex.get("red")),
            ply_u8(vertex.get("green")),
            ply_u8(vertex.get("blue")),
        ) {
            (Some(r), Some(g), Some(b)) => Rgb::new(r, g, b),
            _ => Rgb::SEGMENTED,
        };

        let point = ColoredPoint::from_coords(x, y, z, color);
        if point.is_finite() {
            cloud.push(point);
        }
    }

    tracing::debug!(path = %path.display(), points = cloud.len(), "read point cloud");
    Ok(cloud)
}

/// Writes `cloud` as an ASCII PLY file.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let path = path.as_ref();
    let io_err = |e: std::io::Error| PointCloudError::IoWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    write!(
        writer,
        "ply\n\
         format ascii 1.0\n\
         element vertex {}\n\
         property float x\n\
         property float y\n\
         property float z\n\
         property uchar red\n\
         property uchar green\n\
         property uchar blue\n\
         end_header\n",
        cloud.len()
    )
    .map_err(io_err)?;

    for point in cloud.iter() {
        let p = &point.position;
        let c = point.color;
        writeln!(writer, "{} {} {} {} {} {}", p.x as f32, p.y as f32, p.z as f32, c.r, c.g, c.b)
            .map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    tracing::debug!(path = %path.display(), points = cloud.len(), "wrote point cloud");
    Ok(())
}

fn ply_float(prop: Option<&Property>) -> Option<f64> {
    match prop? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn ply_u8(prop: Option<&Property>) -> Option<u8> {
    match prop? {
        Property::UChar(v) => Some(*v),
        Property::Char(v) => Some((*v).max(0) as u8),
        Property::UShort(v) => Some((*v).min(255) as u8),
        Property::Short(v) => Some((*v).clamp(0, 255) as u8),
        Property::UInt(v) => Some((*v).min(255) as u8),
        Property::Int(v) => Some((*v).clamp(0, 255) as u8),
        Property::Float(v) => Some((v * 255.0).clamp(0.0, 255.0) as u8),
        Property::Double(v) => Some((v * 255.0).clamp(0.0, 255.0) as u8),
        _ => None,
    }
}
