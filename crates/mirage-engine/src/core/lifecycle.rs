use super::SceneError;

/// Where a scene instance is in its life.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    /// Constructed; no GPU resources exist yet.
    Created,
    /// One-time GPU setup finished; no frame drawn yet.
    SurfaceReady,
    Running,
    /// Resolution-dependent resources were rebuilt; the next frame resumes
    /// `Running`.
    Resized,
    /// Resources released. Terminal.
    TornDown,
}

/// Transition guard shared by every scene.
///
/// ```text
/// Created -> SurfaceReady -> Running <-> Resized
///                 \______________\_________\____-> TornDown
/// ```
///
/// A surface may be re-created (context loss) from any live state, which
/// returns the scene to `SurfaceReady`.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Created,
        }
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[inline]
    pub fn is_torn_down(&self) -> bool {
        self.state == LifecycleState::TornDown
    }

    /// True once GPU resources exist and until teardown.
    #[inline]
    pub fn has_surface(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::SurfaceReady | LifecycleState::Running | LifecycleState::Resized
        )
    }

    pub fn surface_created(&mut self) -> Result<(), SceneError> {
        if self.is_torn_down() {
            return Err(SceneError::TornDown);
        }
        self.transition(LifecycleState::SurfaceReady);
        Ok(())
    }

    pub fn surface_changed(&mut self) -> Result<(), SceneError> {
        self.require_surface()?;
        self.transition(LifecycleState::Resized);
        Ok(())
    }

    /// Entry check for a draw tick; moves the scene into `Running`.
    pub fn begin_frame(&mut self) -> Result<(), SceneError> {
        self.require_surface()?;
        self.transition(LifecycleState::Running);
        Ok(())
    }

    /// Returns false if the scene was already torn down.
    pub fn tear_down(&mut self) -> bool {
        if self.is_torn_down() {
            return false;
        }
        self.transition(LifecycleState::TornDown);
        true
    }

    fn require_surface(&self) -> Result<(), SceneError> {
        match self.state {
            LifecycleState::TornDown => Err(SceneError::TornDown),
            LifecycleState::Created => Err(SceneError::NotReady(self.state)),
            _ => Ok(()),
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        if self.state != next {
            log::debug!("scene lifecycle {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_before_surface_is_rejected() {
        let mut lc = Lifecycle::new();
        assert!(matches!(
            lc.begin_frame(),
            Err(SceneError::NotReady(LifecycleState::Created))
        ));
        assert!(matches!(lc.surface_changed(), Err(SceneError::NotReady(_))));
    }

    #[test]
    fn full_cycle() {
        let mut lc = Lifecycle::new();
        lc.surface_created().unwrap();
        assert_eq!(lc.state(), LifecycleState::SurfaceReady);
        lc.surface_changed().unwrap();
        assert_eq!(lc.state(), LifecycleState::Resized);
        lc.begin_frame().unwrap();
        assert_eq!(lc.state(), LifecycleState::Running);
        lc.surface_changed().unwrap();
        lc.begin_frame().unwrap();
        assert_eq!(lc.state(), LifecycleState::Running);
        assert!(lc.tear_down());
        assert!(!lc.tear_down());
    }

    #[test]
    fn everything_after_teardown_fails() {
        let mut lc = Lifecycle::new();
        lc.surface_created().unwrap();
        lc.tear_down();
        assert!(matches!(lc.surface_created(), Err(SceneError::TornDown)));
        assert!(matches!(lc.surface_changed(), Err(SceneError::TornDown)));
        assert!(matches!(lc.begin_frame(), Err(SceneError::TornDown)));
        assert!(!lc.has_surface());
    }

    #[test]
    fn surface_recreation_returns_to_ready() {
        let mut lc = Lifecycle::new();
        lc.surface_created().unwrap();
        lc.begin_frame().unwrap();
        lc.surface_created().unwrap();
        assert_eq!(lc.state(), LifecycleState::SurfaceReady);
    }
}
