//! The toolkit context.
//!
//! [`ToolkitContext`] owns every piece of process-wide state (the widget
//! registry, the theme store, the invalidation sets, the layout engine and
//! the event router) and is the host's programmatic surface: create and
//! destroy widgets, `configure`/`cget`, attach geometry managers, register
//! input handlers, move focus, release capture. Several contexts can live in
//! one process without sharing anything.

use crate::app::AppConfig;
use crate::backend::DrawBackend;
use crate::config::mediator::{self, ConfigBatch};
use crate::config::value::Value;
use crate::dom::node::{NodeId, WidgetNode};
use crate::dom::registry::WidgetRegistry;
use crate::error::{Error, Result};
use crate::event::focus::FocusChain;
use crate::event::input::InputEvent;
use crate::event::router::{self, EventCx, EventRouter, Handled, Outcome};
use crate::geometry::{Point, Rect, Size};
use crate::invalidation::{Dirty, Invalidation};
use crate::layout::engine::{LayoutEngine, LayoutReport};
use crate::layout::manager::{GeometryManager, LayoutOptions};
use crate::paint::{self, Highlight};
use crate::theme::{Theme, ThemeStore};
use crate::widget::kind::{Affects, WidgetKind};

/// Registry, themes, invalidation, layout and routing for one window.
#[derive(Debug)]
pub struct ToolkitContext {
    registry: WidgetRegistry,
    themes: ThemeStore,
    invalidation: Invalidation,
    engine: LayoutEngine,
    pub(crate) router: EventRouter,
    root: NodeId,
    window: Rect,
    /// Destroyed ids the drawing backend has not been told about yet.
    released: Vec<NodeId>,
}

impl ToolkitContext {
    /// Build a context: register the built-in and configured themes, activate
    /// the startup theme, and create the window root.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut themes = ThemeStore::new();
        if let Some(source) = &config.theme_source {
            themes.load_source(source)?;
        }
        themes.set_active(&config.theme)?;

        let mut registry = WidgetRegistry::new();
        let mut root_node = WidgetNode::new(WidgetKind::Window);
        if let Some(title) = &config.title {
            root_node
                .config
                .insert("title".to_string(), Value::from(title.as_str()));
        }
        let root = registry.register(root_node);
        let window = Rect::new(0, 0, config.width.max(0), config.height.max(0));

        let mut invalidation = Invalidation::new();
        invalidation.mark(&mut registry, root, Dirty::LAYOUT | Dirty::PAINT);
        invalidation.add_damage(window);

        tracing::debug!(
            theme = %config.theme,
            width = window.width,
            height = window.height,
            "toolkit context created"
        );
        Ok(Self {
            registry,
            themes,
            invalidation,
            engine: LayoutEngine::new(config.max_layout_iterations),
            router: EventRouter::new(),
            root,
            window,
            released: Vec::new(),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The window root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn window(&self) -> Rect {
        self.window
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    pub fn invalidation(&self) -> &Invalidation {
        &self.invalidation
    }

    pub fn node(&self, id: NodeId) -> Result<&WidgetNode> {
        self.registry.lookup(id)
    }

    pub fn rect(&self, id: NodeId) -> Result<Rect> {
        self.registry.lookup(id).map(WidgetNode::rect)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        self.registry.lookup(id).map(WidgetNode::children)
    }

    pub fn is_quarantined(&self, id: NodeId) -> bool {
        self.engine.is_quarantined(id)
    }

    /// Whether the context has been shut down.
    pub fn is_shut_down(&self) -> bool {
        !self.registry.contains(self.root)
    }

    // ── Tree ─────────────────────────────────────────────────────────

    /// Create a widget of `kind` under `parent` with an initial configuration.
    ///
    /// The configuration is validated before anything is created.
    pub fn create(
        &mut self,
        parent: NodeId,
        kind: WidgetKind,
        config: impl Into<ConfigBatch>,
    ) -> Result<NodeId> {
        let batch = config.into();
        if !self.registry.lookup(parent)?.kind().is_container() {
            return Err(Error::NotAContainer(parent));
        }
        mediator::validate_batch(kind, &batch)?;

        let mut node = WidgetNode::new(kind);
        for (key, value) in batch.iter() {
            node.config.insert(key.to_string(), value.clone());
        }
        let id = self.registry.register_child(parent, node)?;
        self.invalidation.mark_geometry(&mut self.registry, id);
        tracing::debug!(?id, ?parent, %kind, "widget created");
        if selects(&batch) {
            self.deselect_group_peers(id)?;
        }
        Ok(id)
    }

    /// Destroy `id` and its whole subtree. Returns how many widgets were
    /// removed.
    pub fn destroy(&mut self, id: NodeId) -> Result<usize> {
        if id == self.root {
            return Err(Error::RootNode);
        }
        let parent = self.registry.lookup(id)?.parent();
        let damage = self
            .registry
            .walk_depth_first(id)
            .into_iter()
            .filter_map(|n| self.registry.get(n))
            .fold(Rect::EMPTY, |acc, n| acc.union(n.rect()));

        let removed = self.registry.remove_subtree(id);
        self.forget_all(&removed);
        self.invalidation.add_damage(damage);
        if let Some(parent) = parent {
            self.invalidation.mark_geometry(&mut self.registry, parent);
        }
        tracing::debug!(?id, removed = removed.len(), "widget destroyed");
        Ok(removed.len())
    }

    fn forget_all(&mut self, removed: &[NodeId]) {
        for &gone in removed {
            self.invalidation.forget(gone);
            self.engine.forget(gone);
            self.router.forget(gone);
        }
        self.released.extend_from_slice(removed);
    }

    /// Ids destroyed since the last call, for releasing backend resources.
    pub fn take_released(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.released)
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Apply a configuration batch, all-or-nothing.
    ///
    /// A successful configure also lifts a layout quarantine on the widget.
    pub fn configure(&mut self, id: NodeId, batch: impl Into<ConfigBatch>) -> Result<()> {
        let batch = batch.into();
        mediator::configure(
            &mut self.registry,
            &self.themes,
            &mut self.invalidation,
            id,
            &batch,
        )?;
        self.lift_quarantine(id);
        if selects(&batch) {
            self.deselect_group_peers(id)?;
        }
        Ok(())
    }

    /// Uncheck every other radio button in `id`'s group once `id` is checked.
    fn deselect_group_peers(&mut self, id: NodeId) -> Result<()> {
        if self.registry.lookup(id)?.kind() != WidgetKind::RadioButton {
            return Ok(());
        }
        let group = self.text(id, "group");
        if group.is_empty() {
            return Ok(());
        }
        let peers: Vec<NodeId> = self
            .registry
            .ids()
            .into_iter()
            .filter(|&other| {
                other != id
                    && self.registry.get(other).map(WidgetNode::kind) == Some(WidgetKind::RadioButton)
                    && self.text(other, "group") == group
                    && self.cget(other, "checked").ok().and_then(|v| v.as_bool()) == Some(true)
            })
            .collect();
        let off = ConfigBatch::new().set("checked", false);
        for &peer in &peers {
            mediator::configure(&mut self.registry, &self.themes, &mut self.invalidation, peer, &off)?;
        }
        if !peers.is_empty() {
            tracing::debug!(?id, %group, deselected = peers.len(), "radio group selection moved");
        }
        Ok(())
    }

    fn text(&self, id: NodeId, key: &str) -> String {
        self.cget(id, key)
            .ok()
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn cget(&self, id: NodeId, key: &str) -> Result<Value> {
        mediator::cget(&self.registry, &self.themes, id, key)
    }

    fn lift_quarantine(&mut self, id: NodeId) {
        if self.engine.release(id) {
            tracing::debug!(?id, "layout quarantine lifted");
            self.invalidation.mark_geometry(&mut self.registry, id);
        }
    }

    // ── Geometry management ──────────────────────────────────────────

    /// Attach `manager` to container `id`, replacing the previous one.
    ///
    /// Every existing child's layout options must suit the new manager.
    pub fn attach_manager(&mut self, id: NodeId, manager: GeometryManager) -> Result<()> {
        let node = self.registry.lookup(id)?;
        if !node.kind().is_container() {
            return Err(Error::NotAContainer(id));
        }
        for &child in node.children() {
            let options = self.registry.lookup(child)?.layout_options();
            if !manager.accepts(options) {
                return Err(Error::NotAContainer(child));
            }
            manager.validate(options)?;
        }
        tracing::debug!(?id, manager = manager.name(), "geometry manager attached");
        self.registry.lookup_mut(id)?.manager = Some(manager);
        self.lift_quarantine(id);
        self.invalidation.mark_geometry(&mut self.registry, id);
        Ok(())
    }

    /// Set how `id` is placed by its parent's geometry manager.
    ///
    /// Fails with `NotAContainer` when the parent's manager (absolute
    /// placement if none is attached) does not take this kind of options.
    pub fn set_layout_options(&mut self, id: NodeId, options: impl Into<LayoutOptions>) -> Result<()> {
        let options = options.into();
        let parent = self
            .registry
            .lookup(id)?
            .parent()
            .ok_or(Error::NotAContainer(id))?;
        match self.registry.lookup(parent)?.manager() {
            Some(manager) => {
                if !manager.accepts(&options) {
                    return Err(Error::NotAContainer(id));
                }
                manager.validate(&options)?;
            }
            None => {
                if !GeometryManager::Place.accepts(&options) {
                    return Err(Error::NotAContainer(id));
                }
            }
        }
        self.registry.lookup_mut(id)?.layout_options = options;
        self.lift_quarantine(parent);
        self.invalidation.mark_geometry(&mut self.registry, id);
        Ok(())
    }

    // ── Flags ────────────────────────────────────────────────────────

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let node = self.registry.lookup_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        let rect = node.rect;
        self.invalidation.add_damage(rect);
        self.invalidation.mark_geometry(&mut self.registry, id);
        if !visible {
            self.drop_focus_within(id);
        }
        Ok(())
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        let node = self.registry.lookup_mut(id)?;
        if node.enabled == enabled {
            return Ok(());
        }
        node.enabled = enabled;
        self.invalidation.mark_paint(&mut self.registry, id);
        if !enabled {
            self.drop_focus_within(id);
        }
        Ok(())
    }

    pub fn set_focusable(&mut self, id: NodeId, focusable: bool) -> Result<()> {
        self.registry.lookup_mut(id)?.focusable = focusable;
        if !focusable && self.router.focused == Some(id) {
            self.set_focus(None);
        }
        Ok(())
    }

    /// Stacking order among siblings.
    pub fn set_z(&mut self, id: NodeId, z: i32) -> Result<()> {
        let node = self.registry.lookup_mut(id)?;
        if node.z_index == z {
            return Ok(());
        }
        node.z_index = z;
        let rect = node.rect;
        self.invalidation.add_damage(rect);
        self.invalidation.mark_paint(&mut self.registry, id);
        Ok(())
    }

    fn drop_focus_within(&mut self, id: NodeId) {
        if let Some(focused) = self.router.focused {
            if self.registry.is_ancestor_or_self(id, focused) {
                self.set_focus(None);
            }
        }
        if let Some(captured) = self.router.captured {
            if self.registry.is_ancestor_or_self(id, captured) {
                self.release_capture();
            }
        }
        if let Some(hovered) = self.router.hovered {
            if self.registry.is_ancestor_or_self(id, hovered) {
                self.set_hover(None);
            }
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Install an input handler on `id`, replacing any previous one.
    pub fn on_event<F>(&mut self, id: NodeId, handler: F) -> Result<()>
    where
        F: FnMut(&mut EventCx<'_>, &InputEvent) -> Handled + 'static,
    {
        self.registry.lookup(id)?;
        self.router.set_handler(id, handler);
        Ok(())
    }

    pub fn remove_handler(&mut self, id: NodeId) -> bool {
        self.router.remove_handler(id)
    }

    /// Route one input event. Never fails; unclaimed events come back
    /// [`Outcome::Unconsumed`].
    pub fn dispatch(&mut self, event: &InputEvent) -> Outcome {
        router::route(self, event)
    }

    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        router::hit_test(&self.registry, self.root, point)
    }

    // ── Focus and capture ────────────────────────────────────────────

    /// Whether `id` may hold focus: focusable, and it and every ancestor
    /// visible and enabled.
    pub fn can_focus(&self, id: NodeId) -> bool {
        let Some(node) = self.registry.get(id) else {
            return false;
        };
        node.can_take_focus()
            && self.registry.ancestors(id).iter().all(|&a| {
                self.registry
                    .get(a)
                    .is_some_and(|n| n.is_visible() && n.is_enabled())
            })
    }

    /// The focused widget, if it is still able to hold focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.router.focused.filter(|&id| self.can_focus(id))
    }

    /// Force focus onto `id`. Returns `false` when the widget cannot take it.
    pub fn focus(&mut self, id: NodeId) -> Result<bool> {
        self.registry.lookup(id)?;
        if !self.can_focus(id) {
            return Ok(false);
        }
        self.set_focus(Some(id));
        Ok(true)
    }

    pub fn clear_focus(&mut self) {
        self.set_focus(None);
    }

    /// Move focus forward in tab order, wrapping.
    pub fn focus_next(&mut self) -> Option<NodeId> {
        let next = FocusChain::build(&self.registry, self.root).next(self.focused());
        if next.is_some() {
            self.set_focus(next);
        }
        next
    }

    /// Move focus backward in tab order, wrapping.
    pub fn focus_previous(&mut self) -> Option<NodeId> {
        let previous = FocusChain::build(&self.registry, self.root).previous(self.focused());
        if previous.is_some() {
            self.set_focus(previous);
        }
        previous
    }

    pub(crate) fn set_focus(&mut self, next: Option<NodeId>) {
        let previous = self.router.focused;
        if previous == next {
            return;
        }
        self.router.focused = next;
        for id in previous.into_iter().chain(next) {
            self.invalidation.mark_paint(&mut self.registry, id);
        }
        tracing::trace!(?previous, ?next, "focus moved");
    }

    /// Route every pointer event to `id` until released.
    pub fn capture(&mut self, id: NodeId) {
        if !self.registry.contains(id) {
            return;
        }
        let previous = self.router.captured.replace(id);
        if previous != Some(id) {
            for node in previous.into_iter().chain(Some(id)) {
                self.invalidation.mark_paint(&mut self.registry, node);
            }
        }
    }

    pub fn captured(&self) -> Option<NodeId> {
        self.router.captured.filter(|&id| self.registry.contains(id))
    }

    /// Force-release the pointer capture. Returns the node that held it.
    pub fn release_capture(&mut self) -> Option<NodeId> {
        let released = self.router.captured.take()?;
        self.invalidation.mark_paint(&mut self.registry, released);
        self.registry.contains(released).then_some(released)
    }

    /// The widget under the pointer as of the last pointer event.
    pub fn hovered(&self) -> Option<NodeId> {
        self.router.hovered.filter(|&id| self.registry.contains(id))
    }

    pub(crate) fn set_hover(&mut self, next: Option<NodeId>) {
        let previous = self.router.hovered;
        if previous == next {
            return;
        }
        self.router.hovered = next;
        for id in previous.into_iter().chain(next) {
            if self.registry.contains(id) {
                self.invalidation.mark_paint(&mut self.registry, id);
            }
        }
        tracing::trace!(?previous, ?next, "hover moved");
    }

    // ── Themes ───────────────────────────────────────────────────────

    pub fn active_theme(&self) -> Option<&str> {
        self.themes.active_name()
    }

    /// Switch the active theme and restyle every widget it affects.
    pub fn set_active_theme(&mut self, name: &str) -> Result<()> {
        let previous = self.themes.set_active(name)?;
        let restyled = self.restyle(previous.as_ref());
        tracing::debug!(theme = name, restyled, "theme switched");
        Ok(())
    }

    /// Register or replace a theme. Replacing the active theme restyles.
    pub fn load_theme(&mut self, theme: Theme) -> Result<()> {
        let name = theme.name().to_string();
        if let Some(previous) = self.themes.load_theme(theme)? {
            let restyled = self.restyle(Some(&previous));
            tracing::debug!(theme = %name, restyled, "active theme reloaded");
        }
        Ok(())
    }

    /// Parse theme source text and register every theme in it. Returns the
    /// names loaded.
    pub fn load_theme_source(&mut self, source: &str) -> Result<Vec<String>> {
        let loaded = self.themes.load_source(source)?;
        let mut names = Vec::with_capacity(loaded.len());
        for (name, previous) in loaded {
            if let Some(previous) = previous {
                self.restyle(Some(&previous));
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Mark every widget whose theme-resolved style differs from what it was
    /// under `previous`. Keys the widget overrides are unaffected. Returns how
    /// many widgets were marked.
    fn restyle(&mut self, previous: Option<&Theme>) -> usize {
        let themes = &self.themes;
        let invalidation = &mut self.invalidation;
        let mut marked = 0;
        self.registry.broadcast(
            |_| true,
            |registry, id| {
                let Some(node) = registry.get(id) else {
                    return;
                };
                let (mut geometry, mut paint) = (false, false);
                for spec in themes.changed_keys(node.kind(), previous) {
                    if node.override_value(spec.key).is_some() {
                        continue;
                    }
                    match spec.affects {
                        Affects::Geometry => geometry = true,
                        Affects::Paint => paint = true,
                        Affects::None => {}
                    }
                }
                if geometry {
                    invalidation.mark_geometry(registry, id);
                } else if paint {
                    invalidation.mark_paint(registry, id);
                } else {
                    return;
                }
                marked += 1;
            },
        );
        marked
    }

    /// Apply `action` to every widget matching `predicate`. The id set is
    /// snapshotted first, so the action may create or destroy widgets.
    pub fn broadcast<P, A>(&mut self, mut predicate: P, mut action: A) -> usize
    where
        P: FnMut(&WidgetNode) -> bool,
        A: FnMut(&mut ToolkitContext, NodeId),
    {
        let mut applied = 0;
        for id in self.registry.ids() {
            let matches = match self.registry.get(id) {
                Some(node) => predicate(node),
                None => continue,
            };
            if matches {
                action(self, id);
                applied += 1;
            }
        }
        applied
    }

    // ── Frame work ───────────────────────────────────────────────────

    /// Run the pending layout pass.
    pub fn layout(&mut self) -> Result<LayoutReport> {
        self.engine.run(
            &mut self.registry,
            &self.themes,
            &mut self.invalidation,
            self.root,
            self.window,
        )
    }

    pub fn is_layout_pending(&self) -> bool {
        self.invalidation.is_layout_pending()
    }

    /// Drain the paint set and redraw the dirty region. Returns the region
    /// drawn, empty when nothing was dirty.
    pub fn paint(&mut self, backend: &mut dyn DrawBackend) -> Result<Rect> {
        let dirty = self
            .invalidation
            .take_paint(&self.registry)
            .intersection(self.window);
        if dirty.is_empty() {
            return Ok(Rect::EMPTY);
        }
        backend.begin_frame(dirty)?;
        let painted = paint::paint(
            &self.registry,
            &self.themes,
            self.root,
            dirty,
            Highlight {
                focused: self.focused(),
                hovered: self.hovered(),
            },
            backend,
        )?;
        tracing::trace!(?dirty, painted, "paint pass complete");
        Ok(dirty)
    }

    /// Resize the window; the root is re-laid out on the next pass.
    pub fn resize(&mut self, size: Size) {
        let window = Rect::new(0, 0, size.width.max(0), size.height.max(0));
        if window == self.window {
            return;
        }
        self.window = window;
        self.invalidation
            .mark(&mut self.registry, self.root, Dirty::LAYOUT | Dirty::PAINT);
        self.invalidation.add_damage(window);
        tracing::debug!(width = window.width, height = window.height, "window resized");
    }

    /// Destroy every widget, root included, and drop all routing state.
    /// Returns every id removed that the backend has not been told about.
    pub fn shutdown(&mut self) -> Vec<NodeId> {
        let removed = self.registry.remove_subtree(self.root);
        self.forget_all(&removed);
        self.router.clear();
        self.invalidation = Invalidation::new();
        tracing::debug!(removed = removed.len(), "toolkit shut down");
        self.take_released()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

/// Whether `batch` checks a widget.
fn selects(batch: &ConfigBatch) -> bool {
    batch
        .iter()
        .filter(|(key, _)| *key == "checked")
        .last()
        .is_some_and(|(_, value)| value.as_bool() == Some(true))
}
