use facade_core::intersection::IntersectionKind;
use facade_edit::manipulator::{EditMode, EventOutcome};
use facade_edit::session::{replay, Session};

const SESSION: &str = r#"{
  "scene": {
    "meshes": {
      "wall": {
        "points": [[-1, -1, 0], [1, -1, 0], [1, 1, 0], [-1, 1, 0]],
        "faces": [[0, 1, 2, 3]]
      }
    },
    "cameras": {
      "front": {
        "name": "front",
        "position": [0, 0, 10],
        "orientation": [0, 0, 0, 1],
        "focal_length": 35,
        "horizontal_aperture": 36
      }
    }
  },
  "events": [
    { "type": "PointerMove", "position": [258, 178], "camera": "front",
      "viewport": { "width": 640, "height": 480 } },
    { "type": "PointerPress", "position": [258, 178], "camera": "front",
      "viewport": { "width": 640, "height": 480 }, "modifiers": { "ctrl": true } },
    { "type": "PointerDrag", "position": [240, 160], "camera": "front",
      "viewport": { "width": 640, "height": 480 }, "modifiers": { "ctrl": true } },
    { "type": "PointerRelease", "position": [240, 160], "camera": "front",
      "viewport": { "width": 640, "height": 480 }, "modifiers": { "ctrl": true } },
    { "type": "KeyPress", "key": "C" }
  ]
}"#;

#[test]
fn recorded_session_replays() {
    let session: Session = serde_json::from_str(SESSION).unwrap();
    assert_eq!(5, session.events.len());

    let report = replay(session);
    assert_eq!(1, report.activation.rebuilt);
    assert_eq!(
        EventOutcome::Hover {
            kind: IntersectionKind::Point
        },
        report.outcomes[0]
    );
    assert_eq!(
        EventOutcome::Committed {
            mesh: "wall".to_string(),
            vertices: vec![0],
        },
        report.outcomes[3]
    );
    assert_eq!(EditMode::CreateFace, report.final_mode);
    assert_eq!(1, report.undo_depth);
    assert!(serde_json::to_string(&report).is_ok());
}
