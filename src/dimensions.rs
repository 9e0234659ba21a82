//! Width/height resolution under an optional locked aspect ratio.
//!
//! Pure arithmetic, no image access. The natural size comes from whoever
//! decoded the source; `None` means the source had no usable size and the
//! aspect lock degrades to manual entry.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when either side is zero.
    pub fn aspect_ratio(self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }

    /// Both sides multiplied by `scale`, rounded, never below one pixel.
    pub fn scaled(self, scale: f32) -> Self {
        Self {
            width: round_to_pixels(self.width as f64 * scale as f64),
            height: round_to_pixels(self.height as f64 * scale as f64),
        }
    }

    pub fn is_landscape(self) -> bool {
        self.width > self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Width,
    Height,
}

/// A single user edit: which box was touched and its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub field: Field,
    pub value: u32,
}

/// Apply one edit to `current`.
///
/// With `lock_aspect` and a known natural size, the untouched side is derived
/// from the natural aspect ratio; otherwise it keeps its value from `current`.
pub fn resolve(
    natural: Option<Dimensions>,
    current: Dimensions,
    edit: Edit,
    lock_aspect: bool,
) -> Dimensions {
    let ratio = if lock_aspect {
        natural.and_then(Dimensions::aspect_ratio)
    } else {
        None
    };

    match (edit.field, ratio) {
        (Field::Width, Some(ratio)) => Dimensions {
            width: edit.value,
            height: round_to_pixels(edit.value as f64 / ratio),
        },
        (Field::Height, Some(ratio)) => Dimensions {
            width: round_to_pixels(edit.value as f64 * ratio),
            height: edit.value,
        },
        (Field::Width, None) => Dimensions {
            width: edit.value,
            ..current
        },
        (Field::Height, None) => Dimensions {
            height: edit.value,
            ..current
        },
    }
}

/// Requested output size before resolution against a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lock_aspect: bool,
}

impl Default for ResizeTarget {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            lock_aspect: true,
        }
    }
}

impl ResizeTarget {
    /// Resolve against the natural size of a source.
    ///
    /// Unset sides start from the natural size. When only one side is given it
    /// is treated as the last edit; when both are given they are used as-is.
    /// Without a natural size an unset side stays 0 and the request is later
    /// rejected as having invalid dimensions.
    pub fn resolve(&self, natural: Option<Dimensions>) -> Dimensions {
        let start = natural.unwrap_or(Dimensions::new(0, 0));
        let current = Dimensions {
            width: self.width.unwrap_or(start.width),
            height: self.height.unwrap_or(start.height),
        };

        let edit = match (self.width, self.height) {
            (Some(value), None) => Edit {
                field: Field::Width,
                value,
            },
            (None, Some(value)) => Edit {
                field: Field::Height,
                value,
            },
            _ => return current,
        };

        resolve(natural, current, edit, self.lock_aspect)
    }
}

fn round_to_pixels(value: f64) -> u32 {
    // f64::round is half-away-from-zero, which is half-up for our positive inputs
    (value.round().min(u32::MAX as f64) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTO: Dimensions = Dimensions {
        width: 4000,
        height: 3000,
    };

    fn width_edit(value: u32) -> Edit {
        Edit {
            field: Field::Width,
            value,
        }
    }

    fn height_edit(value: u32) -> Edit {
        Edit {
            field: Field::Height,
            value,
        }
    }

    #[test]
    fn locked_width_derives_height() {
        let out = resolve(Some(PHOTO), PHOTO, width_edit(1200), true);
        assert_eq!(out, Dimensions::new(1200, 900));
    }

    #[test]
    fn locked_height_derives_width() {
        let out = resolve(Some(PHOTO), PHOTO, height_edit(300), true);
        assert_eq!(out, Dimensions::new(400, 300));
    }

    #[test]
    fn unlocked_edit_keeps_other_side() {
        let current = Dimensions::new(800, 777);
        let out = resolve(Some(PHOTO), current, width_edit(1200), false);
        assert_eq!(out, Dimensions::new(1200, 777));
    }

    #[test]
    fn lock_without_natural_size_is_manual() {
        let current = Dimensions::new(640, 480);
        let out = resolve(None, current, height_edit(100), true);
        assert_eq!(out, Dimensions::new(640, 100));

        let zero_height = Dimensions::new(100, 0);
        let out = resolve(Some(zero_height), current, width_edit(50), true);
        assert_eq!(out, Dimensions::new(50, 480));
    }

    #[test]
    fn paired_side_rounds_half_up() {
        // 3 / (2/1) = 1.5 -> 2
        let out = resolve(Some(Dimensions::new(2, 1)), PHOTO, width_edit(3), true);
        assert_eq!(out.height, 2);
    }

    #[test]
    fn paired_side_never_below_one() {
        let wide = Dimensions::new(5000, 10);
        let out = resolve(Some(wide), wide, width_edit(10), true);
        assert_eq!(out, Dimensions::new(10, 1));
    }

    #[test]
    fn natural_width_returns_natural_height() {
        for (w, h) in [(4000, 3000), (1, 1), (1920, 1080), (333, 997), (7, 3)] {
            let natural = Dimensions::new(w, h);
            let out = resolve(Some(natural), natural, width_edit(w), true);
            assert!(out.height.abs_diff(h) <= 1, "{w}x{h} -> {out:?}");
        }
    }

    #[test]
    fn target_with_single_side_follows_lock() {
        let target = ResizeTarget {
            width: Some(1200),
            height: None,
            lock_aspect: true,
        };
        assert_eq!(target.resolve(Some(PHOTO)), Dimensions::new(1200, 900));

        let unlocked = ResizeTarget {
            lock_aspect: false,
            ..target
        };
        assert_eq!(unlocked.resolve(Some(PHOTO)), Dimensions::new(1200, 3000));
    }

    #[test]
    fn target_defaults_to_natural_size() {
        assert_eq!(ResizeTarget::default().resolve(Some(PHOTO)), PHOTO);
        let both = ResizeTarget {
            width: Some(10),
            height: Some(20),
            lock_aspect: true,
        };
        assert_eq!(both.resolve(Some(PHOTO)), Dimensions::new(10, 20));
    }

    #[test]
    fn scaling_rounds_and_clamps() {
        assert_eq!(PHOTO.scaled(0.55), Dimensions::new(2200, 1650));
        assert_eq!(Dimensions::new(3, 3).scaled(0.1), Dimensions::new(1, 1));
    }
}
