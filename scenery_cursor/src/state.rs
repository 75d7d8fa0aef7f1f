// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cursor's hover/click/fuse state machine.
//!
//! [`CursorState`] holds no scene references. Every input returns the ordered
//! [`CursorEffect`]s the caller must apply, addressed either to the entity
//! carrying the cursor ([`Recipient::Owner`]) or to a hovered target.
//!
//! ```
//! use scenery_cursor::config::CursorConfig;
//! use scenery_cursor::state::{CursorEffect, CursorPhase, CursorState, Recipient};
//!
//! let mut cursor: CursorState<u32> = CursorState::new(CursorConfig::default());
//! let fx = cursor.on_intersection(9, 1.0);
//! assert_eq!(fx.len(), 4);
//! assert_eq!(cursor.phase(), CursorPhase::Hovering(9));
//!
//! let _ = cursor.on_pointer_down();
//! let fx = cursor.on_pointer_up();
//! assert!(fx.contains(&CursorEffect::Emit { to: Recipient::Target(9), event: "click" }));
//! ```

use scenery_entity::event::names;
use tracing::trace;

use crate::config::CursorConfig;

/// Identifies one arming of the fuse. A fuse that fires with a token other
/// than the live one is ignored.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FuseToken(u64);

/// Where the cursor is in its hover cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorPhase<K> {
    /// Nothing hovered.
    Idle,
    /// Hovering a target with no fuse running.
    Hovering(K),
    /// Hovering a target while the fuse counts down.
    FusePending {
        /// Hovered target.
        target: K,
        /// Live fuse.
        token: FuseToken,
    },
}

impl<K: Copy> CursorPhase<K> {
    /// The hovered target, if any.
    pub fn target(&self) -> Option<K> {
        match *self {
            Self::Idle => None,
            Self::Hovering(t) | Self::FusePending { target: t, .. } => Some(t),
        }
    }
}

/// Who an effect applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Recipient<K> {
    /// The entity carrying the cursor.
    Owner,
    /// A hovered entity.
    Target(K),
}

/// One action the caller performs on the scene.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorEffect<K> {
    /// Emit `event` on the recipient.
    Emit {
        /// Recipient.
        to: Recipient<K>,
        /// Event name from [`names`].
        event: &'static str,
    },
    /// Add a state to the recipient.
    AddState {
        /// Recipient.
        to: Recipient<K>,
        /// State name.
        state: &'static str,
    },
    /// Remove a state from the recipient.
    RemoveState {
        /// Recipient.
        to: Recipient<K>,
        /// State name.
        state: &'static str,
    },
    /// Arm a one-shot timer that reports back through
    /// [`CursorState::on_fuse_elapsed`].
    StartFuse {
        /// Token to report back.
        token: FuseToken,
        /// Delay in time units.
        delay: u64,
    },
    /// Disarm the timer started for `token`.
    CancelFuse(FuseToken),
}

/// Hover, click, and fuse logic for one cursor.
#[derive(Clone, Debug)]
pub struct CursorState<K: Copy + Eq> {
    config: CursorConfig,
    phase: CursorPhase<K>,
    pressed_on: Option<K>,
    next_token: u64,
}

impl<K: Copy + Eq + core::fmt::Debug> CursorState<K> {
    /// An idle cursor.
    pub fn new(config: CursorConfig) -> Self {
        Self {
            config,
            phase: CursorPhase::Idle,
            pressed_on: None,
            next_token: 0,
        }
    }

    /// Current settings.
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> CursorPhase<K> {
        self.phase
    }

    /// The hovered target, if any.
    pub fn target(&self) -> Option<K> {
        self.phase.target()
    }

    /// Replace the settings. A running fuse is cancelled when the new
    /// settings no longer arm one; otherwise it keeps its original delay.
    pub fn reconfigure(&mut self, config: CursorConfig) -> Vec<CursorEffect<K>> {
        self.config = config;
        let mut out = Vec::new();
        if let CursorPhase::FusePending { target, token } = self.phase
            && !config.fuse_armed()
        {
            out.push(CursorEffect::CancelFuse(token));
            self.phase = CursorPhase::Hovering(target);
        }
        out
    }

    /// The raycaster reports `target` as its closest hit.
    ///
    /// Ignored when `target` is already hovered or is `max_distance` or
    /// further away. A different hovered target is left first.
    pub fn on_intersection(&mut self, target: K, distance: f64) -> Vec<CursorEffect<K>> {
        if self.target() == Some(target) {
            return Vec::new();
        }
        if distance.is_nan() || distance >= self.config.max_distance {
            trace!(?target, distance, "intersection out of range");
            return Vec::new();
        }
        let mut out = self.leave();
        out.extend([
            CursorEffect::AddState {
                to: Recipient::Target(target),
                state: names::STATE_HOVERED,
            },
            CursorEffect::Emit {
                to: Recipient::Target(target),
                event: names::MOUSEENTER,
            },
            CursorEffect::Emit {
                to: Recipient::Target(target),
                event: names::HOVER,
            },
            CursorEffect::AddState {
                to: Recipient::Owner,
                state: names::STATE_HOVERING,
            },
        ]);
        if self.config.fuse_armed() {
            let token = FuseToken(self.next_token);
            self.next_token += 1;
            out.push(CursorEffect::StartFuse {
                token,
                delay: self.config.timeout,
            });
            self.phase = CursorPhase::FusePending { target, token };
        } else {
            self.phase = CursorPhase::Hovering(target);
        }
        out
    }

    /// The raycaster lost `target`. Only the hovered target is cleared.
    pub fn on_cleared(&mut self, target: K) -> Vec<CursorEffect<K>> {
        if self.target() != Some(target) {
            return Vec::new();
        }
        self.leave()
    }

    /// The fuse timer armed with `token` fired.
    pub fn on_fuse_elapsed(&mut self, token: FuseToken) -> Vec<CursorEffect<K>> {
        match self.phase {
            CursorPhase::FusePending { target, token: live } if live == token => {
                self.phase = CursorPhase::Hovering(target);
                vec![
                    CursorEffect::Emit {
                        to: Recipient::Owner,
                        event: names::CLICK,
                    },
                    CursorEffect::Emit {
                        to: Recipient::Target(target),
                        event: names::CLICK,
                    },
                ]
            }
            _ => {
                trace!(?token, "stale fuse ignored");
                Vec::new()
            }
        }
    }

    /// Pointer pressed. Remembers the hovered target for the click check.
    pub fn on_pointer_down(&mut self) -> Vec<CursorEffect<K>> {
        self.pressed_on = self.target();
        self.emit_both(names::MOUSEDOWN)
    }

    /// Pointer released. Clicks when the press began on the target that is
    /// still hovered, unless the cursor clicks by fuse.
    pub fn on_pointer_up(&mut self) -> Vec<CursorEffect<K>> {
        let mut out = self.emit_both(names::MOUSEUP);
        let pressed_on = self.pressed_on.take();
        if !self.config.fuse && pressed_on.is_some() && pressed_on == self.target() {
            out.extend(self.emit_both(names::CLICK));
        }
        out
    }

    /// Leave the hovered target, if any, and forget a pending press.
    pub fn reset(&mut self) -> Vec<CursorEffect<K>> {
        self.pressed_on = None;
        self.leave()
    }

    fn leave(&mut self) -> Vec<CursorEffect<K>> {
        let (target, token) = match self.phase {
            CursorPhase::Idle => return Vec::new(),
            CursorPhase::Hovering(target) => (target, None),
            CursorPhase::FusePending { target, token } => (target, Some(token)),
        };
        self.phase = CursorPhase::Idle;
        let mut out = vec![
            CursorEffect::RemoveState {
                to: Recipient::Target(target),
                state: names::STATE_HOVERED,
            },
            CursorEffect::Emit {
                to: Recipient::Target(target),
                event: names::MOUSELEAVE,
            },
            CursorEffect::RemoveState {
                to: Recipient::Owner,
                state: names::STATE_HOVERING,
            },
        ];
        out.extend(token.map(CursorEffect::CancelFuse));
        out
    }

    fn emit_both(&self, event: &'static str) -> Vec<CursorEffect<K>> {
        let mut out = vec![CursorEffect::Emit {
            to: Recipient::Owner,
            event,
        }];
        if let Some(target) = self.target() {
            out.push(CursorEffect::Emit {
                to: Recipient::Target(target),
                event,
            });
        }
        out
    }
}
