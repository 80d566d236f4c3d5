//! Extraction session: one immutable original plus the live parameters.
//!
//! Every parameter change re-renders from the original with the full
//! parameter set. The previous rendered payload is only ever replaced, never
//! used as input, so error never accumulates across edits.

use std::fmt;

use tracing::{debug, warn};

use crate::export::{ExportKind, ExportedImage};
use crate::payload::ImagePayload;
use crate::render::{render, RenderError};
use crate::{ParameterError, ParameterUpdate, TransformParameters};

/// Identifier of one session, assigned by whoever creates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// The editable state of one extracted object.
#[derive(Debug, Clone)]
pub struct ExtractionSession {
    id: SessionId,
    original: Option<ImagePayload>,
    params: TransformParameters,
    rendered: Option<ImagePayload>,
    last_render_error: Option<RenderError>,
    render_count: u64,
}

impl ExtractionSession {
    /// Start a session from a freshly extracted image, with default parameters.
    pub fn new(id: SessionId, original: ImagePayload) -> Self {
        Self {
            original: Some(original),
            ..Self::pending(id)
        }
    }

    /// A session whose original has not arrived yet.
    ///
    /// Parameter updates are stored but nothing renders until
    /// [`attach_original`](Self::attach_original) is called.
    pub fn pending(id: SessionId) -> Self {
        Self {
            id,
            original: None,
            params: TransformParameters::default(),
            rendered: None,
            last_render_error: None,
            render_count: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn original(&self) -> Option<&ImagePayload> {
        self.original.as_ref()
    }

    pub fn params(&self) -> &TransformParameters {
        &self.params
    }

    /// The image to display: the latest successful render, or the original
    /// before any render has succeeded. `None` until an original exists.
    pub fn current_rendered(&self) -> Option<&ImagePayload> {
        self.rendered.as_ref().or(self.original.as_ref())
    }

    /// The most recent render failure, cleared by the next successful render.
    pub fn last_render_error(&self) -> Option<&RenderError> {
        self.last_render_error.as_ref()
    }

    /// Number of renders attempted so far.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Set the original of a pending session and render it with the stored
    /// parameters. Returns `false` (and changes nothing) if an original is
    /// already set.
    pub fn attach_original(&mut self, original: ImagePayload) -> bool {
        if self.original.is_some() {
            warn!(session = %self.id, "original already set; ignoring new payload");
            return false;
        }
        self.original = Some(original);
        self.rerender();
        true
    }

    /// Overwrite one parameter and re-render.
    pub fn update_parameter(&mut self, update: ParameterUpdate) -> Result<(), ParameterError> {
        self.params.apply(update)?;
        self.rerender();
        Ok(())
    }

    /// Overwrite several parameters and render once.
    ///
    /// All updates are validated first; if any is rejected none is applied.
    pub fn update_parameters<I>(&mut self, updates: I) -> Result<(), ParameterError>
    where
        I: IntoIterator<Item = ParameterUpdate>,
    {
        let updates: Vec<ParameterUpdate> = updates.into_iter().collect();
        for update in &updates {
            update.validate()?;
        }

        let mut params = self.params;
        for update in updates {
            params.apply(update)?;
        }
        self.params = params;
        self.rerender();
        Ok(())
    }

    /// Return every parameter to its default and re-render.
    pub fn reset_parameters(&mut self) {
        self.params = TransformParameters::default();
        self.rerender();
    }

    /// Package a payload for export. `None` until an original exists.
    pub fn export(&self, kind: ExportKind) -> Option<ExportedImage> {
        let payload = match kind {
            ExportKind::Edited => self.current_rendered(),
            ExportKind::RawExtraction => self.original.as_ref(),
        }?;
        Some(ExportedImage {
            kind,
            payload: payload.clone(),
        })
    }

    fn rerender(&mut self) {
        let Some(original) = &self.original else {
            debug!(session = %self.id, "no original yet; render deferred");
            return;
        };

        self.render_count += 1;
        match render(original, &self.params) {
            Ok(rendered) => {
                debug!(
                    session = %self.id,
                    bytes = rendered.len(),
                    "rendered extraction"
                );
                self.rendered = Some(rendered);
                self.last_render_error = None;
            }
            Err(err) => {
                warn!(
                    session = %self.id,
                    error = %err,
                    "render failed; keeping previous image"
                );
                self.last_render_error = Some(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_image, DecodedImage};
    use crate::encode::encode_png;

    fn original() -> ImagePayload {
        let (w, h) = (5u32, 3u32);
        let pixels: Vec<u8> = (0..w * h)
            .flat_map(|i| [(i * 15) as u8, 80, (255 - i * 10) as u8, 255])
            .collect();
        ImagePayload::new(encode_png(&pixels, w, h).unwrap())
    }

    fn decode(payload: &ImagePayload) -> DecodedImage {
        decode_image(payload.as_bytes()).unwrap()
    }

    fn session() -> ExtractionSession {
        ExtractionSession::new(SessionId::new(1), original())
    }

    #[test]
    fn test_new_session_shows_original() {
        let session = session();
        assert!(session.params().is_default());
        assert_eq!(session.current_rendered(), Some(&original()));
        assert_eq!(session.render_count(), 0);
    }

    #[test]
    fn test_update_rerenders_from_original() {
        let mut session = session();
        session
            .update_parameter(ParameterUpdate::Brightness(1.5))
            .unwrap();
        assert_eq!(session.render_count(), 1);
        let rendered = session.current_rendered().unwrap().clone();
        assert_ne!(decode(&rendered), decode(&original()));
        assert_eq!(session.original(), Some(&original()));
    }

    #[test]
    fn test_same_params_give_same_bytes() {
        let mut session = session();
        session
            .update_parameter(ParameterUpdate::Brightness(1.5))
            .unwrap();
        let first = session.current_rendered().unwrap().clone();

        session
            .update_parameter(ParameterUpdate::Brightness(0.6))
            .unwrap();
        session
            .update_parameter(ParameterUpdate::Brightness(1.5))
            .unwrap();
        assert_eq!(session.current_rendered(), Some(&first));
    }

    #[test]
    fn test_parameter_order_does_not_matter() {
        let mut a = session();
        a.update_parameter(ParameterUpdate::Rotation(90.0)).unwrap();
        a.update_parameter(ParameterUpdate::FlipHorizontal(true))
            .unwrap();

        let mut b = session();
        b.update_parameter(ParameterUpdate::FlipHorizontal(true))
            .unwrap();
        b.update_parameter(ParameterUpdate::Rotation(90.0)).unwrap();

        assert_eq!(a.current_rendered(), b.current_rendered());
    }

    #[test]
    fn test_rejected_update_changes_nothing() {
        let mut session = session();
        let err = session
            .update_parameter(ParameterUpdate::Saturation(2.5))
            .unwrap_err();
        assert!(matches!(err, ParameterError::OutOfRange { .. }));
        assert!(session.params().is_default());
        assert_eq!(session.render_count(), 0);
    }

    #[test]
    fn test_batch_renders_once() {
        let mut session = session();
        session
            .update_parameters([
                ParameterUpdate::Brightness(1.2),
                ParameterUpdate::Contrast(1.4),
                ParameterUpdate::FlipVertical(true),
            ])
            .unwrap();
        assert_eq!(session.render_count(), 1);
        assert_eq!(session.params().contrast, 1.4);
        assert!(session.params().flip_vertical);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut session = session();
        let result = session.update_parameters([
            ParameterUpdate::Brightness(1.2),
            ParameterUpdate::Blur(11.0),
        ]);
        assert!(result.is_err());
        assert_eq!(session.params().brightness, 1.0);
        assert_eq!(session.render_count(), 0);
    }

    #[test]
    fn test_reset_restores_original_pixels() {
        let mut session = session();
        session
            .update_parameters([
                ParameterUpdate::Brightness(1.8),
                ParameterUpdate::Rotation(-30.0),
            ])
            .unwrap();
        session.reset_parameters();
        assert!(session.params().is_default());
        let rendered = session.current_rendered().unwrap();
        assert_eq!(decode(rendered), decode(&original()));
    }

    #[test]
    fn test_render_failure_keeps_previous_image() {
        let garbage = ImagePayload::new(b"broken".to_vec());
        let mut session = ExtractionSession::new(SessionId::new(2), garbage.clone());
        session
            .update_parameter(ParameterUpdate::Brightness(1.5))
            .unwrap();

        // Parameter accepted, render absorbed, display untouched
        assert_eq!(session.params().brightness, 1.5);
        assert_eq!(session.current_rendered(), Some(&garbage));
        assert!(matches!(
            session.last_render_error(),
            Some(RenderError::Decode(_))
        ));
    }

    #[test]
    fn test_pending_session_defers_render() {
        let mut session = ExtractionSession::pending(SessionId::new(3));
        session
            .update_parameter(ParameterUpdate::Brightness(1.5))
            .unwrap();
        assert_eq!(session.current_rendered(), None);
        assert_eq!(session.render_count(), 0);
        assert!(session.export(ExportKind::Edited).is_none());

        assert!(session.attach_original(original()));
        assert_eq!(session.render_count(), 1);

        let mut reference = ExtractionSession::new(SessionId::new(4), original());
        reference
            .update_parameter(ParameterUpdate::Brightness(1.5))
            .unwrap();
        assert_eq!(session.current_rendered(), reference.current_rendered());
    }

    #[test]
    fn test_original_is_set_once() {
        let mut session = session();
        let other = ImagePayload::new(vec![1, 2, 3]);
        assert!(!session.attach_original(other));
        assert_eq!(session.original(), Some(&original()));
    }

    #[test]
    fn test_export_kinds() {
        let mut session = session();
        session
            .update_parameter(ParameterUpdate::Contrast(1.5))
            .unwrap();

        let edited = session.export(ExportKind::Edited).unwrap();
        assert_eq!(edited.file_name(), "edited_image.png");
        assert_eq!(Some(&edited.payload), session.current_rendered());

        let raw = session.export(ExportKind::RawExtraction).unwrap();
        assert_eq!(raw.file_name(), "extracted_object.png");
        assert_eq!(raw.payload, original());
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId::new(7).to_string(), "session-7");
        assert!(SessionId::new(1) < SessionId::new(2));
    }
}
