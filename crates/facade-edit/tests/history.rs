mod common;

use common::*;
use facade_core::error::{EditError, StoreError};
use facade_edit::command::{CommandHistory, EditCommand, VertexMove};
use nalgebra::Point3;

fn nudge(mesh: &str, index: usize, from: Point3<f64>, to: Point3<f64>) -> EditCommand {
    EditCommand::MoveVertices {
        mesh: mesh.to_string(),
        moves: vec![VertexMove { index, from, to }],
    }
}

#[test]
fn undo_and_redo_walk_the_stacks() {
    let mut scene = scene_with("wall", square());
    let mut history = CommandHistory::new();
    let from = Point3::new(-1.0, -1.0, 0.0);
    let to = Point3::new(-1.5, -1.0, 0.0);

    history.execute(nudge("wall", 0, from, to), &mut scene).unwrap();
    assert_eq!(to, scene.mesh("wall").unwrap().points[0]);

    assert_eq!("wall", history.undo(&mut scene).unwrap());
    assert_eq!(from, scene.mesh("wall").unwrap().points[0]);
    assert_eq!(1, history.redo_depth());

    assert_eq!("wall", history.redo(&mut scene).unwrap());
    assert_eq!(to, scene.mesh("wall").unwrap().points[0]);
    assert_eq!(Err(EditError::NothingToRedo), history.redo(&mut scene));

    history.undo(&mut scene).unwrap();
    let second = nudge("wall", 1, Point3::new(1.0, -1.0, 0.0), Point3::new(2.0, -1.0, 0.0));
    history.execute(second, &mut scene).unwrap();
    assert_eq!(0, history.redo_depth());
    assert_eq!(1, history.undo_depth());
}

#[test]
fn rejected_commit_leaves_history_alone() {
    let mut scene = scene_with("wall", square());
    let mut history = CommandHistory::new();
    let result = history.execute(nudge("roof", 0, Point3::origin(), Point3::origin()), &mut scene);
    assert_eq!(
        Err(EditError::CommitFailure(StoreError::MissingMesh("roof".to_string()))),
        result.cloned()
    );
    assert_eq!(0, history.undo_depth());
    assert_eq!(Err(EditError::NothingToUndo), history.undo(&mut scene));
}

#[test]
fn added_face_is_undone_and_redone() {
    let mut scene = scene_with("wall", square());
    let mut history = CommandHistory::new();
    let positions = [
        Point3::new(1.0, -1.0, 0.0),
        Point3::new(3.0, -1.0, 0.0),
        Point3::new(3.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ];
    let applied = history
        .execute(
            EditCommand::AddFace {
                mesh: "wall".to_string(),
                positions,
                added: None,
            },
            &mut scene,
        )
        .unwrap();
    assert_eq!(vec![1, 4, 5, 2], applied.vertices());

    history.undo(&mut scene).unwrap();
    assert_eq!(square(), *scene.mesh("wall").unwrap());
    history.redo(&mut scene).unwrap();
    assert_eq!(2, scene.mesh("wall").unwrap().faces.len());
}
