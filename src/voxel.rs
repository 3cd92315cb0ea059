use serde::{Serialize, Deserialize};

/// Value-typed voxel color, straight RGBA bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct Rgba{
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba{
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self{
        Self{r, g, b, a}
    }

    pub fn to_f32_array(&self) -> [f32; 4]{
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl Default for Rgba{
    fn default() -> Self{
        Self::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoxelMaterial{
    #[default]
    Air,
    Stone,
    Dirt,
    Grass,
}

impl VoxelMaterial{
    pub fn is_solid(&self) -> bool{
        !matches!(self, VoxelMaterial::Air)
    }
}

pub const FACE_NUM: usize = 6;

/// Cube face, fixed index order.
/// 0 = down, 1 = up, 2 = north, 3 = south, 4 = east, 5 = west
/// (-y, +y, -z, +z, +x, -x)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face{
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    East = 4,
    West = 5,
}

impl Face{
    pub const ALL: [Face; FACE_NUM] = [
        Face::Down, Face::Up, Face::North, Face::South, Face::East, Face::West,
    ];

    pub fn from_index(index: usize) -> Self{
        match index{
            0 => Face::Down,
            1 => Face::Up,
            2 => Face::North,
            3 => Face::South,
            4 => Face::East,
            5 => Face::West,
            _ => panic!("face index out of bound!"),
        }
    }

    pub fn index(&self) -> usize{
        *self as usize
    }

    /// outward unit normal
    pub fn normal(&self) -> [f32; 3]{
        match self{
            Face::Down => [0.0, -1.0, 0.0],
            Face::Up => [0.0, 1.0, 0.0],
            Face::North => [0.0, 0.0, -1.0],
            Face::South => [0.0, 0.0, 1.0],
            Face::East => [1.0, 0.0, 0.0],
            Face::West => [-1.0, 0.0, 0.0],
        }
    }

    /// grid step towards the neighbor this face looks at
    pub fn offset(&self) -> [i64; 3]{
        match self{
            Face::Down => [0, -1, 0],
            Face::Up => [0, 1, 0],
            Face::North => [0, 0, -1],
            Face::South => [0, 0, 1],
            Face::East => [1, 0, 0],
            Face::West => [-1, 0, 0],
        }
    }

    pub fn opposite(&self) -> Face{
        match self{
            Face::Down => Face::Up,
            Face::Up => Face::Down,
            Face::North => Face::South,
            Face::South => Face::North,
            Face::East => Face::West,
            Face::West => Face::East,
        }
    }

    /// Quad corners of the face on a unit cube at the origin,
    /// wound counter-clockwise as seen from outside the cube.
    pub fn corners(&self) -> [[f32; 3]; 4]{
        match self{
            Face::Down => [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            Face::Up => [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
            Face::North => [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            Face::South => [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
            Face::East => [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
            Face::West => [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
        }
    }

    /// texture coordinate for each entry of [`Face::corners`]
    pub fn corner_tex_coords() -> [[f32; 2]; 4]{
        [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]
    }
}

/// One cell of a chunk grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Voxel{
    pub material: VoxelMaterial,
    pub color: Rgba,
    pub visible_faces: [bool; FACE_NUM],
}

impl Voxel{
    pub const AIR: Voxel = Voxel{
        material: VoxelMaterial::Air,
        color: Rgba::new(0, 0, 0, 0),
        visible_faces: [false; FACE_NUM],
    };

    pub fn new(material: VoxelMaterial, color: Rgba) -> Self{
        Self{
            material,
            color,
            visible_faces: [false; FACE_NUM],
        }
    }

    pub fn is_face_visible(&self, face: Face) -> bool{
        self.visible_faces[face.index()]
    }

    pub fn set_face_visible(&mut self, face: Face, visible: bool){
        self.visible_faces[face.index()] = visible;
    }
}

impl Default for Voxel{
    fn default() -> Self{
        Voxel::AIR
    }
}

#[cfg(test)]
mod test{
    use super::*;
    use vek::*;
    use super::Rgba;

    #[test]
    fn test_face_index_order(){
        //fixed order: down, up, north, south, east, west
        assert_eq!(Face::Down.index(), 0);
        assert_eq!(Face::Up.index(), 1);
        assert_eq!(Face::North.index(), 2);
        assert_eq!(Face::South.index(), 3);
        assert_eq!(Face::East.index(), 4);
        assert_eq!(Face::West.index(), 5);

        for (i, face) in Face::ALL.iter().enumerate(){
            assert_eq!(Face::from_index(i), *face);
        }
    }

    #[test]
    fn test_face_normals_are_unit_axes(){
        for face in Face::ALL.iter(){
            let normal = Vec3::<f32>::from(face.normal());
            assert_eq!(normal.magnitude(), 1.0);

            let offset = face.offset();
            assert_eq!(normal, Vec3::new(offset[0] as f32, offset[1] as f32, offset[2] as f32));
        }
    }

    #[test]
    fn test_face_opposite(){
        for face in Face::ALL.iter(){
            assert_eq!(face.opposite().opposite(), *face);
            let a = Vec3::<f32>::from(face.normal());
            let b = Vec3::<f32>::from(face.opposite().normal());
            assert_eq!(a, -b);
        }
    }

    #[test]
    fn test_face_corners_wind_ccw_from_outside(){
        for face in Face::ALL.iter(){
            let corners = face.corners();
            let c0 = Vec3::<f32>::from(corners[0]);
            let c1 = Vec3::<f32>::from(corners[1]);
            let c2 = Vec3::<f32>::from(corners[2]);
            let cross = (c1 - c0).cross(c2 - c0);
            let dot = cross.dot(Vec3::from(face.normal()));
            assert!(dot > 0.0, "face {:?} winds the wrong way", face);

            //all corners lie on the face plane
            let normal = face.normal();
            let axis = normal.iter().position(|v| *v != 0.0).unwrap();
            let plane = if normal[axis] > 0.0 {1.0} else {0.0};
            for corner in corners.iter(){
                assert_eq!(corner[axis], plane);
            }
        }
    }

    #[test]
    fn test_voxel_face_flags(){
        let mut voxel = Voxel::new(VoxelMaterial::Stone, Rgba::WHITE);
        assert!(!voxel.is_face_visible(Face::Up));
        voxel.set_face_visible(Face::Up, true);
        assert!(voxel.is_face_visible(Face::Up));
        assert!(!voxel.is_face_visible(Face::Down));
    }

    #[test]
    fn test_material_solidity(){
        assert!(!VoxelMaterial::Air.is_solid());
        assert!(VoxelMaterial::Stone.is_solid());
        assert!(VoxelMaterial::Grass.is_solid());
    }

    #[test]
    fn test_rgba_to_f32(){
        let color = Rgba::new(255, 0, 255, 255);
        assert_eq!(color.to_f32_array(), [1.0, 0.0, 1.0, 1.0]);
    }
}
