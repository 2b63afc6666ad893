use world_types::Location;

/// A zone's geometry. All intermediate products use 64-bit arithmetic to
/// avoid overflow (spec §4.3).
#[derive(Debug, Clone)]
pub enum ZoneShape {
    /// Tight XY AABB over the vertices; `minZ <= z <= maxZ`.
    Cuboid { vertices: Vec<(i32, i32)>, min_z: i32, max_z: i32 },
    /// First vertex is the centre.
    Cylinder { center: (i32, i32), radius: i32, min_z: i32, max_z: i32 },
    /// Ray-casting polygon containment with exact edge handling.
    NPoly { vertices: Vec<(i32, i32)>, min_z: i32, max_z: i32 },
}

impl ZoneShape {
    pub fn contains(&self, loc: &Location) -> bool {
        match self {
            ZoneShape::Cuboid { vertices, min_z, max_z } => {
                if !(*min_z <= loc.z && loc.z <= *max_z) {
                    return false;
                }
                let (minx, maxx, miny, maxy) = aabb(vertices);
                loc.x >= minx && loc.x <= maxx && loc.y >= miny && loc.y <= maxy
            }
            ZoneShape::Cylinder { center, radius, min_z, max_z } => {
                if !(*min_z <= loc.z && loc.z <= *max_z) {
                    return false;
                }
                let dx = (loc.x - center.0) as i64;
                let dy = (loc.y - center.1) as i64;
                let r = *radius as i64;
                dx * dx + dy * dy <= r * r
            }
            ZoneShape::NPoly { vertices, min_z, max_z } => {
                if !(*min_z <= loc.z && loc.z <= *max_z) {
                    return false;
                }
                npoly_contains(vertices, loc.x, loc.y)
            }
        }
    }

    /// XY bounding box, used to hash the zone into the secondary grid.
    pub fn aabb(&self) -> (i32, i32, i32, i32) {
        match self {
            ZoneShape::Cuboid { vertices, .. } | ZoneShape::NPoly { vertices, .. } => aabb(vertices),
            ZoneShape::Cylinder { center, radius, .. } => (
                center.0 - radius,
                center.0 + radius,
                center.1 - radius,
                center.1 + radius,
            ),
        }
    }
}

fn aabb(vertices: &[(i32, i32)]) -> (i32, i32, i32, i32) {
    let mut minx = i32::MAX;
    let mut maxx = i32::MIN;
    let mut miny = i32::MAX;
    let mut maxy = i32::MIN;
    for &(x, y) in vertices {
        minx = minx.min(x);
        maxx = maxx.max(x);
        miny = miny.min(y);
        maxy = maxy.max(y);
    }
    (minx, maxx, miny, maxy)
}

fn on_segment(p: (i64, i64), a: (i64, i64), b: (i64, i64)) -> bool {
    let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    if cross != 0 {
        return false;
    }
    let (minx, maxx) = (a.0.min(b.0), a.0.max(b.0));
    let (miny, maxy) = (a.1.min(b.1), a.1.max(b.1));
    p.0 >= minx && p.0 <= maxx && p.1 >= miny && p.1 <= maxy
}

/// Ray-casting point-in-polygon. A point exactly on an edge counts as
/// inside (checked explicitly before the crossing test).
fn npoly_contains(vertices: &[(i32, i32)], x: i32, y: i32) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let p = (x as i64, y as i64);

    for i in 0..n {
        let a = (vertices[i].0 as i64, vertices[i].1 as i64);
        let b = (vertices[(i + 1) % n].0 as i64, vertices[(i + 1) % n].1 as i64);
        if on_segment(p, a, b) {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (vertices[i].0 as i64, vertices[i].1 as i64);
        let (xj, yj) = (vertices[j].0 as i64, vertices[j].1 as i64);
        if (yi > p.1) != (yj > p.1) {
            let x_intersect = xi + (p.1 - yi) * (xj - xi) / (yj - yi);
            if p.0 < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
