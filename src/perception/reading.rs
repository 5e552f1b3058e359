//! Raw proximity sensor payloads and their typed form

use glam::Vec3;

/// Status code the simulator reports for a successful read
pub const STATUS_OK: i32 = 0;

/// Number of fields in a proximity sensor payload
pub const READING_ARITY: usize = 5;

/// One loosely typed field as it comes off the transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawField {
    Int(i32),
    Bool(bool),
    Point(Vec3),
}

impl RawField {
    fn kind(&self) -> &'static str {
        match self {
            RawField::Int(_) => "int",
            RawField::Bool(_) => "bool",
            RawField::Point(_) => "point",
        }
    }
}

/// Untyped 5-tuple returned by the gateway:
/// `(status, detected, point, object handle, surface normal)`
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading(pub Vec<RawField>);

impl RawReading {
    /// Build a well-formed payload
    pub fn new(status: i32, detected: bool, point: Vec3, object_handle: i32, normal: Vec3) -> Self {
        Self(vec![
            RawField::Int(status),
            RawField::Bool(detected),
            RawField::Point(point),
            RawField::Int(object_handle),
            RawField::Point(normal),
        ])
    }

    /// A failed read: non-ok status and every other field zeroed
    pub fn failed(status: i32) -> Self {
        Self::new(status, false, Vec3::ZERO, 0, Vec3::ZERO)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typed proximity reading. Only `status` and `detected` feed perception;
/// the geometry is carried along untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub status: i32,
    pub detected: bool,
    pub point: Vec3,
    pub object_handle: i32,
    pub normal: Vec3,
}

impl SensorReading {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

impl TryFrom<&RawReading> for SensorReading {
    type Error = String;

    fn try_from(raw: &RawReading) -> Result<Self, Self::Error> {
        match raw.0.as_slice() {
            [RawField::Int(status), RawField::Bool(detected), RawField::Point(point), RawField::Int(object_handle), RawField::Point(normal)] => {
                Ok(SensorReading {
                    status: *status,
                    detected: *detected,
                    point: *point,
                    object_handle: *object_handle,
                    normal: *normal,
                })
            }
            fields if fields.len() != READING_ARITY => Err(format!(
                "expected {} fields, got {}",
                READING_ARITY,
                fields.len()
            )),
            fields => {
                let kinds: Vec<&str> = fields.iter().map(RawField::kind).collect();
                Err(format!(
                    "expected (int, bool, point, int, point), got ({})",
                    kinds.join(", ")
                ))
            }
        }
    }
}
