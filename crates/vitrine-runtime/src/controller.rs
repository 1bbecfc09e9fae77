//! The model controller: owns the scene and everything that edits it

use crate::config::VitrineConfig;
use crate::import_queue::{ImportCompletion, ImportQueue};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vitrine_animation::{
    load_descriptors, AnimationClip, AnimationDescriptor, AnimationLibrary, Mixer, MixerCommand,
    PoseSample, TrackProperty,
};
use vitrine_core::{NodeId, Result, Vec3, VitrineError};
use vitrine_export::{export, ExportOptions, ExportOutput, ExportSink};
use vitrine_import::{
    import_with, Fetch, HttpFetcher, ImportMeta, ImportOptions, ImportResult, ImportSource,
};
use vitrine_scene::{
    LightRig, NodePatch, ReplaceTicket, SceneNode, SceneSession, SelectionController,
};

/// What happened to one import when it was polled
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    Applied {
        ticket: ReplaceTicket,
        meta: ImportMeta,
    },
    /// A newer import was requested before this one finished
    Discarded { ticket: ReplaceTicket, source: String },
    Failed {
        ticket: ReplaceTicket,
        source: String,
        error: String,
    },
}

/// Result of one `frame`
#[derive(Debug, Default)]
pub struct FrameReport {
    pub imports: Vec<ImportEvent>,
    /// Node properties written from the animation pose
    pub poses_applied: usize,
}

/// Owns the scene session, animation library, mixer and selection state.
///
/// All scene mutation happens on the thread that owns the controller; only
/// decoding runs elsewhere.
pub struct ModelController {
    session: SceneSession,
    library: AnimationLibrary,
    mixer: Mixer,
    selection: SelectionController,
    imports: ImportQueue,
    meta: Option<ImportMeta>,
}

impl Default for ModelController {
    fn default() -> Self {
        Self::new(Arc::new(HttpFetcher::new()), ImportOptions::default())
    }
}

impl ModelController {
    pub fn new(fetcher: Arc<dyn Fetch>, options: ImportOptions) -> Self {
        Self {
            session: SceneSession::new(),
            library: AnimationLibrary::new(),
            mixer: Mixer::new(),
            selection: SelectionController::new(),
            imports: ImportQueue::new(fetcher, options),
            meta: None,
        }
    }

    pub fn from_config(config: &VitrineConfig) -> Result<Self> {
        let mut controller = Self::new(
            Arc::new(HttpFetcher::with_timeout(config.storage.timeout_secs)),
            config.import.options(),
        );
        if let Some(path) = &config.import.animations {
            controller.load_animations(path)?;
        }
        Ok(controller)
    }

    pub fn session(&self) -> &SceneSession {
        &self.session
    }

    pub fn root(&self) -> Option<&SceneNode> {
        self.session.root()
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Facts about the current model
    pub fn meta(&self) -> Option<&ImportMeta> {
        self.meta.as_ref()
    }

    pub fn lights(&self) -> &LightRig {
        self.session.lights()
    }

    pub fn lights_mut(&mut self) -> &mut LightRig {
        self.session.lights_mut()
    }

    // --- Import ---

    /// Decode `source` in the background. Any import requested earlier and
    /// not yet applied becomes stale.
    pub fn request_import(&mut self, source: ImportSource) -> Result<ReplaceTicket> {
        let ticket = self.session.begin_replace();
        log::info!("Importing {}", source);
        self.imports.request(ticket, source)?;
        Ok(ticket)
    }

    /// Apply imports that finished since the last poll
    pub fn poll_imports(&mut self) -> Vec<ImportEvent> {
        let completions = self.imports.poll();
        self.apply_completions(completions)
    }

    /// Block until pending imports finish (or `timeout`), then apply them
    pub fn wait_for_imports(&mut self, timeout: Duration) -> Vec<ImportEvent> {
        let completions = self.imports.wait_all(timeout);
        self.apply_completions(completions)
    }

    /// Decode and apply on the calling thread.
    ///
    /// Pending background imports only go stale once the decode succeeded.
    pub fn import_now(&mut self, source: ImportSource) -> Result<&ImportMeta> {
        log::info!("Importing {}", source);
        let result = import_with(
            &source,
            self.imports.fetcher().as_ref(),
            self.imports.options(),
        )?;
        let ticket = self.session.begin_replace();
        self.apply_import(ticket, result);
        self.meta
            .as_ref()
            .ok_or_else(|| VitrineError::Validation("import was not applied".to_string()))
    }

    fn apply_completions(&mut self, completions: Vec<ImportCompletion>) -> Vec<ImportEvent> {
        let mut events = Vec::with_capacity(completions.len());
        for completion in completions {
            let ImportCompletion {
                ticket,
                source,
                result,
            } = completion;
            let event = match result {
                Err(e) => {
                    log::error!("Import of {} failed: {}", source, e);
                    ImportEvent::Failed {
                        ticket,
                        source,
                        error: e.to_string(),
                    }
                }
                Ok(result) => {
                    let meta = result.meta.clone();
                    if self.apply_import(ticket, result) {
                        ImportEvent::Applied { ticket, meta }
                    } else {
                        ImportEvent::Discarded { ticket, source }
                    }
                }
            };
            events.push(event);
        }
        events
    }

    /// Replace the scene, reset selection, register embedded clips and
    /// rebuild the mixer. Returns false for a stale ticket.
    fn apply_import(&mut self, ticket: ReplaceTicket, result: ImportResult) -> bool {
        let ImportResult { root, clips, meta } = result;
        if !self.session.replace_with(ticket, root) {
            log::warn!("Discarding stale import of {}", meta.name);
            return false;
        }
        self.selection.reset();
        self.library
            .set_embedded(clips.iter().map(AnimationClip::from_imported).collect());
        log::info!(
            "Loaded {} ({} nodes, {} meshes, {} animations)",
            meta.name,
            meta.node_count,
            meta.mesh_count,
            clips.len()
        );
        self.meta = Some(meta);
        self.rebuild_mixer();
        true
    }

    // --- Animation ---

    pub fn available_animations(&self) -> Vec<String> {
        self.library.names()
    }

    /// Add or replace a synthesized animation targeting the model root
    pub fn add_animation(&mut self, name: &str, descriptor: AnimationDescriptor) -> Result<()> {
        self.library.add(name, descriptor)?;
        self.rebuild_mixer();
        Ok(())
    }

    pub fn remove_animation(&mut self, name: &str) -> bool {
        let removed = self.library.remove(name).is_some();
        if removed {
            self.rebuild_mixer();
        }
        removed
    }

    /// Add every descriptor in a `.anim.toml` file; all or none
    pub fn load_animations(&mut self, path: &Path) -> Result<usize> {
        let descriptors = load_descriptors(path)?;
        let count = descriptors.len();
        self.library.extend(descriptors)?;
        self.rebuild_mixer();
        log::info!("Loaded {} animations from {}", count, path.display());
        Ok(count)
    }

    /// Queue a playback command; applied on the next frame
    pub fn command(&mut self, command: MixerCommand) {
        self.mixer.enqueue(command);
    }

    /// Clips to play: embedded plus synthesized ones aimed at the root
    fn current_clips(&self) -> Result<Vec<AnimationClip>> {
        match self.session.root() {
            Some(root) => self.library.clips(&root.name),
            None => Ok(Vec::new()),
        }
    }

    fn rebuild_mixer(&mut self) {
        match self.current_clips() {
            Ok(clips) => self.mixer.rebuild(clips),
            Err(e) => log::error!("Failed to build animation clips: {}", e),
        }
    }

    /// Poll imports, advance the mixer and write the pose into the scene
    pub fn frame(&mut self, dt: f64) -> FrameReport {
        let imports = self.poll_imports();
        let pose = self.mixer.advance(dt);
        let mut poses_applied = 0;
        for sample in pose {
            match self.apply_pose(&sample) {
                Ok(true) => poses_applied += 1,
                Ok(false) => {}
                Err(e) => log::debug!("Pose for {} not applied: {}", sample.node_name, e),
            }
        }
        FrameReport {
            imports,
            poses_applied,
        }
    }

    fn apply_pose(&mut self, sample: &PoseSample) -> Result<bool> {
        let Some(id) = self.session.node_id(&sample.node_name) else {
            return Ok(false);
        };
        let v = &sample.value;
        let at = |i: usize, default: f32| v.get(i).copied().unwrap_or(default);
        let patch = match sample.property {
            TrackProperty::Translation => {
                NodePatch::Translation(Vec3::new(at(0, 0.0), at(1, 0.0), at(2, 0.0)))
            }
            TrackProperty::Scale => NodePatch::Scale(Vec3::new(at(0, 1.0), at(1, 1.0), at(2, 1.0))),
            TrackProperty::Rotation => {
                NodePatch::Rotation([at(0, 0.0), at(1, 0.0), at(2, 0.0), at(3, 1.0)])
            }
        };
        self.session.mutate(id, patch)?;
        Ok(true)
    }

    // --- Editing ---

    /// Apply one edit. Color edits on the hovered node keep the highlight on
    /// top; renames rebuild the clips so poses follow the new name.
    pub fn edit(&mut self, node: NodeId, patch: NodePatch) -> Result<()> {
        let renamed = matches!(patch, NodePatch::Rename(_));
        self.selection.edit(&mut self.session, node, patch)?;
        if renamed {
            self.rebuild_mixer();
        }
        Ok(())
    }

    /// Edit the first node with `name`
    pub fn edit_by_name(&mut self, name: &str, patch: NodePatch) -> Result<()> {
        let id = self
            .session
            .node_id(name)
            .ok_or_else(|| VitrineError::NodeNotFound(name.to_string()))?;
        self.edit(id, patch)
    }

    pub fn pointer_enter(&mut self, node: NodeId) -> Result<()> {
        self.selection.pointer_enter(&mut self.session, node)
    }

    pub fn pointer_leave(&mut self) -> Result<()> {
        self.selection.pointer_leave(&mut self.session)
    }

    pub fn pointer_up(&mut self, node: NodeId) -> NodeId {
        self.selection.pointer_up(node)
    }

    // --- Export ---

    /// Export the current model and its clips. The hover highlight is not
    /// part of the output.
    pub fn export(&mut self, options: &ExportOptions) -> Result<ExportOutput> {
        let hovered = self.selection.hovered();
        if hovered.is_some() {
            self.selection.pointer_leave(&mut self.session)?;
        }

        let result = match self.session.root() {
            Some(root) => self
                .current_clips()
                .and_then(|clips| export(root, &clips, options)),
            None => Err(VitrineError::Validation("no model loaded".to_string())),
        };

        if let Some(node) = hovered {
            self.selection.pointer_enter(&mut self.session, node)?;
        }
        result
    }

    /// Export and deliver to `sink`, returning where it went
    pub fn export_to(&mut self, sink: &dyn ExportSink, options: &ExportOptions) -> Result<String> {
        let output = self.export(options)?;
        let location = sink.deliver(&output)?;
        log::info!("Exported to {}", location);
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use vitrine_animation::PlaybackMode;
    use vitrine_core::{Color, Transform};
    use vitrine_export::LocalFileSink;
    use vitrine_scene::{Geometry, GeometryKind, Material, MaterialKind};

    struct NoNetwork;

    impl Fetch for NoNetwork {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(VitrineError::Network(format!("offline: {}", url)))
        }
    }

    fn new_controller() -> ModelController {
        ModelController::new(Arc::new(NoNetwork), ImportOptions::default())
    }

    /// A GLB of `root_name` with a box child called `Body`
    fn model_bytes(root_name: &str, color: Color) -> Vec<u8> {
        let scene = SceneNode::new(root_name).with_child(
            SceneNode::new("Body")
                .with_geometry(Geometry::primitive(GeometryKind::Box).unwrap())
                .with_material(Material::new(MaterialKind::Standard).with_color(color)),
        );
        export(&scene, &[], &ExportOptions::default()).unwrap().bytes
    }

    fn colored_source(root_name: &str, color: Color) -> ImportSource {
        ImportSource::Bytes {
            name: root_name.to_string(),
            data: model_bytes(root_name, color),
        }
    }

    fn source(root_name: &str) -> ImportSource {
        colored_source(root_name, Color::RED)
    }

    fn body_color(controller: &ModelController) -> Color {
        let body = controller.session().find_by_name("Body").unwrap();
        body.material.as_ref().unwrap().props.color
    }

    fn play(controller: &mut ModelController, name: &str) {
        let selected: BTreeSet<String> = [name.to_string()].into_iter().collect();
        controller.command(MixerCommand::SelectTracks(selected));
        controller.command(MixerCommand::Play);
    }

    #[test]
    fn import_now_replaces_scene() {
        let mut controller = new_controller();
        let meta = controller.import_now(source("Robot")).unwrap();
        assert_eq!(meta.format, "glb");
        assert_eq!(controller.root().unwrap().name, "Robot");
        assert!(controller.session().find_by_name("Body").is_some());
    }

    #[test]
    fn stale_import_is_discarded() {
        let mut controller = new_controller();
        let first = controller.request_import(source("First")).unwrap();
        let second = controller.request_import(source("Second")).unwrap();

        let events = controller.wait_for_imports(Duration::from_secs(30));
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .any(|e| matches!(e, ImportEvent::Discarded { ticket, .. } if *ticket == first)));
        assert!(events
            .iter()
            .any(|e| matches!(e, ImportEvent::Applied { ticket, .. } if *ticket == second)));
        assert_eq!(controller.root().unwrap().name, "Second");
    }

    #[test]
    fn failed_import_keeps_previous_scene() {
        let mut controller = new_controller();
        controller.import_now(source("Robot")).unwrap();
        controller
            .request_import(ImportSource::Url("https://example.com/x.glb".into()))
            .unwrap();
        let events = controller.wait_for_imports(Duration::from_secs(30));
        assert!(matches!(events[0], ImportEvent::Failed { .. }));
        assert_eq!(controller.root().unwrap().name, "Robot");
    }

    #[test]
    fn frame_writes_animation_pose() {
        let mut controller = new_controller();
        controller.import_now(source("Robot")).unwrap();
        controller
            .add_animation("hop", AnimationDescriptor::new(1.0).with_position([0.0, 2.0, 0.0]))
            .unwrap();
        assert_eq!(controller.available_animations(), vec!["hop"]);
        play(&mut controller, "hop");

        let report = controller.frame(0.5);
        assert_eq!(report.poses_applied, 3);
        assert_eq!(controller.mixer().mode(), PlaybackMode::Playing);
        let root = controller.root().unwrap();
        assert!((root.transform.position.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn invalid_animation_changes_nothing() {
        let mut controller = new_controller();
        controller.import_now(source("Robot")).unwrap();
        assert!(controller
            .add_animation("bad", AnimationDescriptor::new(0.0))
            .is_err());
        assert!(controller.available_animations().is_empty());
        assert!(controller.mixer().clip_names().is_empty());
    }

    #[test]
    fn new_import_resets_selection_and_keeps_descriptors() {
        let mut controller = new_controller();
        controller.import_now(source("Robot")).unwrap();
        controller
            .add_animation("spin", AnimationDescriptor::new(2.0).with_rotation([0.0, 90.0, 0.0]))
            .unwrap();
        let body = controller.session().node_id("Body").unwrap();
        controller.pointer_enter(body).unwrap();
        controller.pointer_up(body);

        controller.import_now(source("Other")).unwrap();
        assert!(controller.selection().hovered().is_none());
        assert!(controller.selection().selected().is_none());
        assert_eq!(controller.mixer().clip_names(), vec!["spin"]);
    }

    #[test]
    fn export_skips_hover_highlight() {
        let mut controller = new_controller();
        controller.import_now(source("Robot")).unwrap();
        let body = controller.session().node_id("Body").unwrap();
        let plain = controller.export(&ExportOptions::default()).unwrap();

        controller.pointer_enter(body).unwrap();
        let hovered = controller.export(&ExportOptions::default()).unwrap();
        assert_eq!(plain.bytes, hovered.bytes);
        assert_eq!(controller.selection().hovered(), Some(body));
        let color = controller.session().find(body).unwrap().material.as_ref().unwrap().props.color;
        assert!((color.r - 0.8).abs() < 1e-6);
    }

    #[test]
    fn export_without_model_fails() {
        let mut controller = new_controller();
        assert!(matches!(
            controller.export(&ExportOptions::default()),
            Err(VitrineError::Validation(_))
        ));
    }

    #[test]
    fn edit_then_export_to_file() {
        let mut controller = new_controller();
        controller.import_now(source("Robot")).unwrap();
        controller
            .edit_by_name("Body", NodePatch::Material(MaterialKind::Phong))
            .unwrap();
        assert!(controller
            .edit_by_name("Ghost", NodePatch::Visible(false))
            .is_err());

        let dir = std::env::temp_dir().join(format!("vitrine-runtime-{}", uuid::Uuid::new_v4()));
        let path = controller
            .export_to(&LocalFileSink::new(&dir), &ExportOptions::default())
            .unwrap();
        assert!(path.ends_with("Exported.glb"));

        let mut reloaded = new_controller();
        reloaded
            .import_now(ImportSource::File(Path::new(&path).to_path_buf()))
            .unwrap();
        let body = reloaded.session().find_by_name("Body").unwrap();
        assert_eq!(body.material.as_ref().unwrap().kind(), MaterialKind::Phong);
        assert_eq!(reloaded.root().unwrap().transform, Transform::IDENTITY);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn selected_body_edited_to_red_phong_exports_red_phong() {
        let white = Color::new(1.0, 1.0, 1.0, 1.0);
        let mut controller = new_controller();
        controller.import_now(colored_source("Robot", white)).unwrap();
        let body = controller.session().node_id("Body").unwrap();

        // Clicking means the pointer is over the node
        controller.pointer_enter(body).unwrap();
        assert_eq!(controller.pointer_up(body), body);
        controller
            .edit(body, NodePatch::Material(MaterialKind::Phong))
            .unwrap();
        controller
            .edit(body, NodePatch::Color(Color::parse_hex("#ff0000").unwrap()))
            .unwrap();
        assert_eq!(body_color(&controller), Color::RED.scaled(0.8));

        let output = controller.export(&ExportOptions::default()).unwrap();
        assert_eq!(controller.selection().hovered(), Some(body));

        controller.pointer_leave().unwrap();
        assert_eq!(body_color(&controller), Color::RED);

        let mut reloaded = new_controller();
        reloaded
            .import_now(ImportSource::Bytes {
                name: "exported".to_string(),
                data: output.bytes,
            })
            .unwrap();
        let material = reloaded
            .session()
            .find_by_name("Body")
            .unwrap()
            .material
            .clone()
            .unwrap();
        assert_eq!(material.kind(), MaterialKind::Phong);
        let color = material.props.color;
        assert_eq!((color.r, color.g, color.b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn renaming_root_keeps_synthesized_animation_playing() {
        let mut controller = new_controller();
        controller.import_now(source("rio")).unwrap();
        controller
            .add_animation("hop", AnimationDescriptor::new(2.0).with_position([0.0, 2.0, 0.0]))
            .unwrap();
        play(&mut controller, "hop");
        controller.frame(0.5);

        let root = controller.session().node_id("rio").unwrap();
        controller
            .edit(root, NodePatch::Rename("robot".to_string()))
            .unwrap();
        let report = controller.frame(1.0);
        assert_eq!(report.poses_applied, 3);
        let root = controller.root().unwrap();
        assert_eq!(root.name, "robot");
        assert!(root.transform.position.y > 0.0);
    }

    #[test]
    fn failed_sync_import_leaves_background_import_current() {
        let mut controller = new_controller();
        let pending = controller.request_import(source("Second")).unwrap();
        assert!(controller
            .import_now(ImportSource::Url("https://example.com/x.glb".into()))
            .is_err());

        let events = controller.wait_for_imports(Duration::from_secs(30));
        assert!(events
            .iter()
            .any(|e| matches!(e, ImportEvent::Applied { ticket, .. } if *ticket == pending)));
        assert_eq!(controller.root().unwrap().name, "Second");
    }
}
