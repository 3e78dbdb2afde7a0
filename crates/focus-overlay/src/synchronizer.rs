//! Keeps the overlay element glued to the effective focus target.

use std::fmt;
use std::rc::Rc;

use focus_animation::{AnimationDriver, Easing};
use focus_core::RuntimeHandle;
use focus_ui_graphics::{Density, Rect};

use crate::config::OverlayConfig;
use crate::error::{ConfigError, OverlayError};
use crate::host::{GeometryProbe, OverlayHandle, OverlayHost};
use crate::resolver::FocusTarget;

/// What a single [`OverlaySynchronizer::on_focus_resolved`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    NoTarget,
    /// The target is not laid out, detached or hidden; nothing moved.
    GeometryUnavailable,
    Created(Rect),
    Unchanged,
    Animating { from: Rect, to: Rect },
    Snapped(Rect),
}

impl SyncOutcome {
    pub fn moved_overlay(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Created(_) | SyncOutcome::Animating { .. } | SyncOutcome::Snapped(_)
        )
    }
}

/// Overlay element plus the last rectangle committed to it.
#[derive(Default, Clone)]
pub struct OverlayState {
    rectangle: Option<Rect>,
    element: Option<OverlayHandle>,
}

impl OverlayState {
    /// Destination of the latest move; equals the element's rectangle once
    /// any animation settles.
    pub fn rectangle(&self) -> Option<Rect> {
        self.rectangle
    }

    pub fn element(&self) -> Option<&OverlayHandle> {
        self.element.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.element.is_some()
    }
}

impl fmt::Debug for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayState")
            .field("rectangle", &self.rectangle)
            .field("element", &self.element.is_some())
            .finish()
    }
}

pub struct OverlaySynchronizer {
    config: OverlayConfig,
    probe: Rc<dyn GeometryProbe>,
    host: Rc<dyn OverlayHost>,
    runtime: RuntimeHandle,
    state: OverlayState,
    driver: Option<AnimationDriver<Rect>>,
    visible: bool,
    disposed: bool,
}

impl OverlaySynchronizer {
    pub fn new(
        config: OverlayConfig,
        probe: Rc<dyn GeometryProbe>,
        host: Rc<dyn OverlayHost>,
        runtime: RuntimeHandle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            probe,
            host,
            runtime,
            state: OverlayState::default(),
            driver: None,
            visible: true,
            disposed: false,
        })
    }

    pub fn on_focus_resolved(
        &mut self,
        target: Option<FocusTarget>,
    ) -> Result<SyncOutcome, OverlayError> {
        self.ensure_active("on_focus_resolved")?;
        let Some(target) = target else {
            return Ok(SyncOutcome::NoTarget);
        };

        let element = target.element();
        let target_rect = match target.rectangle(self.probe.as_ref()) {
            Some(rect) if rect.is_valid() && self.probe.is_visible(element) => rect,
            other => {
                log::trace!("skipping overlay update for {element}: geometry {other:?}");
                return Ok(SyncOutcome::GeometryUnavailable);
            }
        };
        let overlay_rect = self.overlay_rect_for(target_rect);

        let Some(handle) = self.state.element.clone() else {
            self.create_overlay(overlay_rect);
            log::debug!("created focus overlay at {overlay_rect:?} around {element}");
            return Ok(SyncOutcome::Created(overlay_rect));
        };

        if self.state.rectangle == Some(overlay_rect) {
            log::trace!("overlay already wraps {element}");
            return Ok(SyncOutcome::Unchanged);
        }
        self.state.rectangle = Some(overlay_rect);

        let Some(driver) = self.driver.as_ref() else {
            handle.borrow_mut().set_rectangle(overlay_rect);
            return Ok(SyncOutcome::Snapped(overlay_rect));
        };
        if self.config.animations_enabled() {
            let from = if driver.is_running() {
                driver.current()
            } else {
                handle.borrow().rectangle()
            };
            log::debug!("animating overlay {from:?} -> {overlay_rect:?}");
            driver.start(from, overlay_rect, self.config.animation_spec());
            Ok(SyncOutcome::Animating {
                from,
                to: overlay_rect,
            })
        } else {
            driver.snap_to(overlay_rect);
            Ok(SyncOutcome::Snapped(overlay_rect))
        }
    }

    /// Target rectangle inflated by the configured margins.
    pub fn overlay_rect_for(&self, target: Rect) -> Rect {
        target.inflate(self.config.margins_px())
    }

    pub fn show_overlay(&mut self) -> Result<(), OverlayError> {
        self.set_visible(true, "show_overlay")
    }

    pub fn hide_overlay(&mut self) -> Result<(), OverlayError> {
        self.set_visible(false, "hide_overlay")
    }

    /// Stops any animation and releases the overlay. Every later call fails
    /// with [`OverlayError::Disposed`].
    pub fn teardown(&mut self) -> Result<(), OverlayError> {
        self.ensure_active("teardown")?;
        if let Some(driver) = self.driver.take() {
            driver.cancel();
        }
        self.state = OverlayState::default();
        self.disposed = true;
        log::debug!("focus overlay torn down");
        Ok(())
    }

    pub fn configure_margins(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> Result<(), OverlayError> {
        self.ensure_active("configure_margins")?;
        self.config
            .set_margins(left, top, right, bottom)
            .map_err(|err| rejected(err.into()))
    }

    pub fn set_animation_duration(&mut self, duration_millis: u64) -> Result<(), OverlayError> {
        self.ensure_active("set_animation_duration")?;
        self.config
            .set_animation_duration(duration_millis)
            .map_err(|err| rejected(err.into()))
    }

    pub fn set_animations_enabled(&mut self, enabled: bool) -> Result<(), OverlayError> {
        self.ensure_active("set_animations_enabled")?;
        self.config.set_animations_enabled(enabled);
        Ok(())
    }

    pub fn set_easing(&mut self, easing: Easing) -> Result<(), OverlayError> {
        self.ensure_active("set_easing")?;
        self.config = self.config.with_easing(easing);
        Ok(())
    }

    pub fn set_density(&mut self, density: Density) -> Result<(), OverlayError> {
        self.ensure_active("set_density")?;
        self.config
            .set_density(density)
            .map_err(|err| rejected(err.into()))
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn overlay(&self) -> Option<OverlayHandle> {
        self.state.element.clone()
    }

    pub fn overlay_rectangle(&self) -> Option<Rect> {
        self.state.rectangle
    }

    pub fn is_animating(&self) -> bool {
        self.driver
            .as_ref()
            .map(|driver| driver.is_running())
            .unwrap_or(false)
    }

    /// Visibility requested through show/hide, applied to the overlay even
    /// if it is created later.
    pub fn is_shown(&self) -> bool {
        self.visible
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn create_overlay(&mut self, overlay_rect: Rect) {
        let handle = self.host.create_overlay();
        {
            let mut element = handle.borrow_mut();
            element.set_visible(self.visible);
            element.set_rectangle(overlay_rect);
        }
        self.host.insert_into_root(&handle);

        let sink = handle.clone();
        self.driver = Some(AnimationDriver::new(
            overlay_rect,
            self.runtime.clone(),
            move |rect: &Rect| sink.borrow_mut().set_rectangle(*rect),
        ));
        self.state = OverlayState {
            rectangle: Some(overlay_rect),
            element: Some(handle),
        };
    }

    fn set_visible(&mut self, visible: bool, operation: &'static str) -> Result<(), OverlayError> {
        self.ensure_active(operation)?;
        self.visible = visible;
        if let Some(element) = self.state.element.as_ref() {
            element.borrow_mut().set_visible(visible);
        }
        Ok(())
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), OverlayError> {
        if self.disposed {
            log::error!("{operation} called on a focus overlay after teardown");
            return Err(OverlayError::Disposed);
        }
        Ok(())
    }
}

fn rejected(err: OverlayError) -> OverlayError {
    log::warn!("rejected overlay configuration: {err}");
    err
}

impl fmt::Debug for OverlaySynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlaySynchronizer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("animating", &self.is_animating())
            .field("visible", &self.visible)
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/synchronizer_tests.rs"]
mod tests;
