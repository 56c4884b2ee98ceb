use std::{io::BufRead, path::Path};

use crate::{error::Error, graph::MeshGraph, primitive::SurfaceMesh};
use glam::DVec3;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        ..Default::default()
    }
}

impl SurfaceMesh {
    /// Read the triangles of an OBJ file. Polygons are triangulated, and all
    /// objects in the file are merged into one surface.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj(path, &load_options())
            .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        Self::from_models(models)
    }

    /// Same as [`SurfaceMesh::load_obj`], from a buffer. Material libraries are
    /// ignored.
    pub fn read_obj<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| Ok(Default::default()))
            .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        Self::from_models(models)
    }

    fn from_models(models: Vec<tobj::Model>) -> Result<Self, Error> {
        let (nverts, nfaces) = models
            .iter()
            .fold((0usize, 0usize), |(nverts, nfaces), model| {
                let msh = &model.mesh;
                (
                    nverts + (msh.positions.len() / 3),
                    nfaces + (msh.indices.len() / 3),
                )
            });
        let mut out = SurfaceMesh {
            points: Vec::with_capacity(nverts),
            triangles: Vec::with_capacity(nfaces),
        };
        for model in models {
            let mesh = model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
            }
            if mesh.indices.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.indices.len()));
            }
            let voffset = out.points.len() as u32;
            out.points.extend(
                mesh.positions
                    .chunks(3)
                    .map(|triplet| DVec3::new(triplet[0], triplet[1], triplet[2])),
            );
            out.triangles.extend(
                mesh.indices
                    .chunks(3)
                    .map(|t| [t[0] + voffset, t[1] + voffset, t[2] + voffset]),
            );
        }
        log::info!(
            "Loaded {} points and {} triangles",
            out.num_vertices(),
            out.num_faces()
        );
        Ok(out)
    }
}

impl MeshGraph {
    /// Graph of the closed surface in an OBJ file.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        SurfaceMesh::load_obj(path)?.graph()
    }

    pub fn read_obj<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        SurfaceMesh::read_obj(reader)?.graph()
    }
}
