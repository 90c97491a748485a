//! Coalesced status record and change detection.
//!
//! Updates arrive as partial patches. A patch produces a [`StateChange`]
//! only when at least one of its fields differs from the stored record, so
//! the change sink never sees a no-op.

use serde::{Deserialize, Serialize};

/// Load failure reported for the source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageError {
    pub message: String,
}

impl ImageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Load state of the current source image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStatus {
    pub is_loaded: bool,
    pub error: Option<ImageError>,
}

impl ImageStatus {
    pub const UNLOADED: ImageStatus = ImageStatus {
        is_loaded: false,
        error: None,
    };

    pub fn loaded() -> Self {
        Self {
            is_loaded: true,
            error: None,
        }
    }

    pub fn failed(error: ImageError) -> Self {
        Self {
            is_loaded: false,
            error: Some(error),
        }
    }
}

/// Full status record exposed to the change sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statements {
    pub image: ImageStatus,
    pub is_double_zooming: bool,
    pub is_zooming: bool,
    pub is_dragging: bool,
}

/// Partial update of [`Statements`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_double_zooming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_zooming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dragging: Option<bool>,
}

impl StatementsPatch {
    pub fn image(status: ImageStatus) -> Self {
        Self {
            image: Some(status),
            ..Self::default()
        }
    }

    pub fn double_zooming(value: bool) -> Self {
        Self {
            is_double_zooming: Some(value),
            ..Self::default()
        }
    }

    pub fn zooming(value: bool) -> Self {
        Self {
            is_zooming: Some(value),
            ..Self::default()
        }
    }

    pub fn dragging(value: bool) -> Self {
        Self {
            is_dragging: Some(value),
            ..Self::default()
        }
    }

    /// True if any supplied field differs from `current`.
    fn differs_from(&self, current: &Statements) -> bool {
        fn differs<T: PartialEq>(patch: &Option<T>, current: &T) -> bool {
            patch.as_ref().is_some_and(|v| v != current)
        }

        differs(&self.image, &current.image)
            || differs(&self.is_double_zooming, &current.is_double_zooming)
            || differs(&self.is_zooming, &current.is_zooming)
            || differs(&self.is_dragging, &current.is_dragging)
    }
}

/// Notification payload: the supplied fields plus the resulting record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    #[serde(flatten)]
    pub changed: StatementsPatch,
    pub state: Statements,
}

/// Owner of the current [`Statements`].
#[derive(Debug, Clone, Default)]
pub struct StatementsTracker {
    current: Statements,
}

impl StatementsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Statements {
        &self.current
    }

    /// Merge `patch`, returning the notification to emit if anything changed.
    pub fn apply(&mut self, patch: StatementsPatch) -> Option<StateChange> {
        if !patch.differs_from(&self.current) {
            return None;
        }

        if let Some(image) = &patch.image {
            self.current.image = image.clone();
        }
        if let Some(value) = patch.is_double_zooming {
            self.current.is_double_zooming = value;
        }
        if let Some(value) = patch.is_zooming {
            self.current.is_zooming = value;
        }
        if let Some(value) = patch.is_dragging {
            self.current.is_dragging = value;
        }

        Some(StateChange {
            changed: patch,
            state: self.current.clone(),
        })
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn patch_strategy() -> impl Strategy<Value = StatementsPatch> {
        (
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(loaded, double, zooming, dragging)| StatementsPatch {
                image: loaded.map(|l| if l { ImageStatus::loaded() } else { ImageStatus::UNLOADED }),
                is_double_zooming: double,
                is_zooming: zooming,
                is_dragging: dragging,
            })
    }

    proptest! {
        /// Property: a notification fires exactly when the record changes.
        #[test]
        fn prop_emits_iff_changed(patches in proptest::collection::vec(patch_strategy(), 1..20)) {
            let mut tracker = StatementsTracker::new();
            for patch in patches {
                let before = tracker.current().clone();
                let emitted = tracker.apply(patch).is_some();
                let changed = *tracker.current() != before;
                prop_assert_eq!(emitted, changed);
            }
        }

        /// Property: re-applying the same patch never notifies twice.
        #[test]
        fn prop_reapply_is_silent(patch in patch_strategy()) {
            let mut tracker = StatementsTracker::new();
            tracker.apply(patch.clone());
            prop_assert!(tracker.apply(patch).is_none());
        }
    }
}
