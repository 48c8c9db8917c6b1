use super::{AssetId, Image};
use crate::error::ResourceError;

/// Cube face, in array-layer order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Array layer of this face in a cube texture.
    #[inline]
    pub fn layer(self) -> u32 {
        self as u32
    }
}

/// Six images forming an environment cube.
#[derive(Debug, Clone)]
pub struct Cubemap {
    faces: [Image; 6],
    id: AssetId,
}

impl Cubemap {
    /// Faces are given as +X, -X, +Y, -Y, +Z, -Z.
    pub fn new(faces: [Image; 6]) -> Self {
        Self {
            faces,
            id: AssetId::next(),
        }
    }

    /// A cube whose six faces share one image.
    pub fn uniform(face: Image) -> Self {
        Self::new(std::array::from_fn(|_| face.clone()))
    }

    #[inline]
    pub fn id(&self) -> AssetId {
        self.id
    }

    #[inline]
    pub fn face(&self, face: CubeFace) -> &Image {
        &self.faces[face as usize]
    }

    /// Face by layer index, `None` outside `0..6`.
    #[inline]
    pub fn face_at(&self, index: usize) -> Option<&Image> {
        self.faces.get(index)
    }

    pub fn faces(&self) -> &[Image; 6] {
        &self.faces
    }

    /// Size shared by all faces.
    pub fn face_size(&self) -> (u32, u32) {
        (self.faces[0].width(), self.faces[0].height())
    }

    /// Checks that every face is non-empty, square, and matches the first
    /// face's size. A non-square first face is reported against its width.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let (width, height) = self.face_size();
        if width != height {
            return Err(ResourceError::MismatchedCubemapFaces {
                face: 0,
                expected: (width, width),
                found: (width, height),
            });
        }

        let expected = (width, height);
        for (face, image) in self.faces.iter().enumerate() {
            let found = (image.width(), image.height());
            if image.is_empty() || found != expected {
                return Err(ResourceError::MismatchedCubemapFaces {
                    face,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PixelFormat;

    #[test]
    fn face_order_matches_layers() {
        let faces: [Image; 6] = std::array::from_fn(|i| Image::solid(1, 1, [i as u8; 4]));
        let cube = Cubemap::new(faces);
        for (i, face) in CubeFace::ALL.iter().enumerate() {
            assert_eq!(face.layer(), i as u32);
            assert_eq!(cube.face(*face).pixels()[0], i as u8);
            assert_eq!(cube.face_at(i).unwrap().id(), cube.face(*face).id());
        }
        assert!(cube.face_at(6).is_none());
    }

    #[test]
    fn validate_accepts_matching_faces() {
        let cube = Cubemap::uniform(Image::solid(8, 8, [0; 4]));
        assert!(cube.validate().is_ok());
        assert_eq!(cube.face_size(), (8, 8));
    }

    #[test]
    fn validate_reports_first_mismatched_face() {
        let mut faces: [Image; 6] = std::array::from_fn(|_| Image::solid(8, 8, [0; 4]));
        faces[4] = Image::solid(4, 8, [0; 4]);
        let err = Cubemap::new(faces).validate().unwrap_err();
        assert_eq!(
            err,
            ResourceError::MismatchedCubemapFaces {
                face: 4,
                expected: (8, 8),
                found: (4, 8)
            }
        );
    }

    #[test]
    fn validate_rejects_non_square_faces() {
        let err = Cubemap::uniform(Image::solid(8, 4, [0; 4])).validate().unwrap_err();
        assert_eq!(
            err,
            ResourceError::MismatchedCubemapFaces {
                face: 0,
                expected: (8, 8),
                found: (8, 4)
            }
        );
    }

    #[test]
    fn validate_rejects_empty_faces() {
        let cube = Cubemap::uniform(Image::zeroed(0, 0, PixelFormat::Rgba8));
        assert!(cube.validate().is_err());
    }

    #[test]
    fn cubemap_id_differs_from_face_ids() {
        let face = Image::solid(2, 2, [9; 4]);
        let cube = Cubemap::uniform(face.clone());
        assert_ne!(cube.id(), face.id());
    }
}
