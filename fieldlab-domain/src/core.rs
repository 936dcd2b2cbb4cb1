use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

pub trait Calc:
    Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Sized
    + PartialOrd
    + Clone
    + Copy
{
}
impl<T> Calc for T where
    T: Add<Output = Self>
        + Sub<Output = Self>
        + Mul<Output = Self>
        + Div<Output = Self>
        + Sized
        + PartialOrd
        + Clone
        + Copy
{
}

/// 2d point, serialized as a `[x, y]` pair both in database files and in the
/// json export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Serialize for Point<T>
where
    T: Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.x, self.y).serialize(serializer)
    }
}
impl<'de, T> Deserialize<'de> for Point<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (x, y) = <(T, T)>::deserialize(deserializer)?;
        Ok(Point { x, y })
    }
}

impl<T> Point<T>
where
    T: Calc,
{
    pub fn len_square(&self) -> T {
        self.x * self.x + self.y * self.y
    }
    pub fn dist_square(&self, other: &Self) -> T {
        (*self - *other).len_square()
    }
    pub fn dot(&self, rhs: &Self) -> T {
        self.x * rhs.x + self.y * rhs.y
    }
}

impl<T> Sub for Point<T>
where
    T: Calc,
{
    type Output = Point<T>;
    fn sub(self, rhs: Self) -> Self::Output {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl<T> Add for Point<T>
where
    T: Calc,
{
    type Output = Point<T>;
    fn add(self, rhs: Self) -> Self::Output {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T> From<(T, T)> for Point<T> {
    fn from(value: (T, T)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}
impl<T> From<Point<T>> for (T, T) {
    fn from(p: Point<T>) -> (T, T) {
        (p.x, p.y)
    }
}

pub type TPtI = i32;
pub type TPtF = f64;
pub type PtI = Point<TPtI>;
pub type PtF = Point<TPtF>;

impl PtI {
    /// Euclidean distance truncated to an integer, used for click-distance
    /// based construction such as a ball's radius.
    #[must_use]
    pub fn trunc_dist(&self, other: &Self) -> TPtI {
        f64::from(self.dist_square(other)).sqrt() as TPtI
    }
}

impl From<PtI> for PtF {
    fn from(p: PtI) -> Self {
        (f64::from(p.x), f64::from(p.y)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arith() {
        let p: PtI = (3, 4).into();
        let q: PtI = (0, 0).into();
        assert_eq!(p.len_square(), 25);
        assert_eq!(p.dist_square(&q), 25);
        assert_eq!(p.trunc_dist(&q), 5);
        assert_eq!(p - q, p);
        assert_eq!(q + p, p);
        // non-square distances truncate, they do not round
        let r: PtI = (1, 2).into();
        assert_eq!(p.dist_square(&r), 8);
        assert_eq!(p.trunc_dist(&r), 2);
    }

    #[test]
    fn test_point_serde_as_pair() {
        let p: PtI = (10, 20).into();
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, "[10,20]");
        let q: PtI = serde_json::from_str(&s).unwrap();
        assert_eq!(p, q);
    }
}
