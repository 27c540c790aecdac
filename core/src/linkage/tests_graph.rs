use crate::geometry::Point2;
use crate::linkage::{JointDef, JointId, JointKind, JointType, Linkage, LinkageError};

#[test]
fn test_ids_are_dense_and_ordered() {
    let mut linkage = Linkage::new();
    let a = linkage.add_static(Point2::new(0.0, 0.0)).unwrap();
    let b = linkage.add_passive(None).unwrap();
    let c = linkage.add_passive(Some(Point2::new(1.0, 1.0))).unwrap();

    assert_eq!(a, JointId(0));
    assert_eq!(b, JointId(1));
    assert_eq!(c, JointId(2));
    assert_eq!(linkage.len(), 3);
}

#[test]
fn test_static_requires_coordinates() {
    let mut linkage = Linkage::new();
    let def = JointDef { kind: JointType::Static, coordinates: None, motor_linkage: None, motor_parent: None };

    assert_eq!(linkage.create_joint(def), Err(LinkageError::MissingCoordinates));
    assert!(linkage.is_empty(), "Failed creation must not consume an id");
}

#[test]
fn test_non_finite_coordinates_rejected() {
    let mut linkage = Linkage::new();
    let err = linkage.add_static(Point2::new(f64::NAN, 0.0)).unwrap_err();
    assert_eq!(err, LinkageError::NonFiniteCoordinates);
    assert!(err.is_construction());
}

#[test]
fn test_motor_creates_driver_link() {
    let mut linkage = Linkage::new();
    let anchor = linkage.add_static(Point2::new(80.0, 50.0)).unwrap();
    let motor = linkage.add_motor(anchor, 10.0).unwrap();

    assert_eq!(linkage.links().len(), 1);
    let link = linkage.links()[0];
    assert_eq!((link.a, link.b, link.length), (motor, anchor, 10.0));
    assert!(link.driver);

    assert_eq!(linkage.adjacency(motor).unwrap(), &[(anchor, 10.0)]);
    assert_eq!(linkage.adjacency(anchor).unwrap(), &[(motor, 10.0)]);

    // Not solved yet
    assert!(linkage.coordinate(motor).is_none());
}

#[test]
fn test_motor_validation() {
    let mut linkage = Linkage::new();
    let anchor = linkage.add_static(Point2::new(0.0, 0.0)).unwrap();
    let passive = linkage.add_passive(None).unwrap();

    // Parent must exist
    assert!(matches!(
        linkage.add_motor(JointId(42), 5.0),
        Err(LinkageError::InvalidMotorParent(_))
    ));

    // Parent cannot be passive
    assert!(matches!(
        linkage.add_motor(passive, 5.0),
        Err(LinkageError::InvalidMotorParent(_))
    ));

    // Length must be positive
    assert_eq!(linkage.add_motor(anchor, 0.0), Err(LinkageError::InvalidLength(0.0)));
    assert_eq!(linkage.add_motor(anchor, -2.0), Err(LinkageError::InvalidLength(-2.0)));

    let missing_length = JointDef { kind: JointType::Motor, coordinates: None, motor_linkage: None, motor_parent: Some(anchor) };
    assert_eq!(linkage.create_joint(missing_length), Err(LinkageError::MissingMotorLinkage));

    let missing_parent = JointDef { kind: JointType::Motor, coordinates: None, motor_linkage: Some(3.0), motor_parent: None };
    assert!(matches!(linkage.create_joint(missing_parent), Err(LinkageError::InvalidMotorParent(_))));

    // Motor positions come from the arm angle only
    let placed_motor = JointDef { coordinates: Some(Point2::new(5.0, 0.0)), ..JointDef::motor(anchor, 5.0) };
    assert_eq!(linkage.create_joint(placed_motor), Err(LinkageError::MotorCoordinates));
    assert!(LinkageError::MotorCoordinates.is_construction());

    // Nothing was added by the failed calls
    assert_eq!(linkage.len(), 2);
    assert!(linkage.links().is_empty());
}

#[test]
fn test_add_link_symmetric_adjacency() {
    let mut linkage = Linkage::new();
    let a = linkage.add_static(Point2::new(0.0, 0.0)).unwrap();
    let b = linkage.add_passive(None).unwrap();
    let c = linkage.add_passive(None).unwrap();

    linkage.add_link(a, b, 3.0).unwrap();
    linkage.add_link(b, c, 4.0).unwrap();

    assert_eq!(linkage.adjacency(a).unwrap(), &[(b, 3.0)]);
    assert_eq!(linkage.adjacency(b).unwrap(), &[(a, 3.0), (c, 4.0)]);
    assert_eq!(linkage.adjacency(c).unwrap(), &[(b, 4.0)]);

    let links: Vec<_> = linkage.links().iter().map(|l| (l.a, l.b, l.length, l.driver)).collect();
    assert_eq!(links, vec![(a, b, 3.0, false), (b, c, 4.0, false)]);
}

#[test]
fn test_add_link_validation() {
    let mut linkage = Linkage::new();
    let a = linkage.add_static(Point2::new(0.0, 0.0)).unwrap();
    let b = linkage.add_passive(None).unwrap();

    assert_eq!(linkage.add_link(a, JointId(7), 1.0), Err(LinkageError::UnknownJoint(JointId(7))));
    assert_eq!(linkage.add_link(JointId(9), b, 1.0), Err(LinkageError::UnknownJoint(JointId(9))));
    assert_eq!(linkage.add_link(b, b, 1.0), Err(LinkageError::SelfLink(b)));
    assert_eq!(linkage.add_link(a, b, 0.0), Err(LinkageError::InvalidLength(0.0)));
    assert!(matches!(linkage.add_link(a, b, f64::INFINITY), Err(LinkageError::InvalidLength(_))));

    assert!(linkage.links().is_empty());
    assert!(linkage.adjacency(a).unwrap().is_empty());
}

#[test]
fn test_joint_type_parsing() {
    assert_eq!("static".parse::<JointType>(), Ok(JointType::Static));
    assert_eq!("Passive".parse::<JointType>(), Ok(JointType::Passive));
    assert_eq!("MOTOR".parse::<JointType>(), Ok(JointType::Motor));

    let err = "slider".parse::<JointType>().unwrap_err();
    assert_eq!(err, LinkageError::InvalidKind("slider".to_string()));
    assert!(err.is_construction());
    assert_eq!(err.code(), "INVALID_KIND");
}

#[test]
fn test_accessors() {
    let mut linkage = Linkage::new();
    let a = linkage.add_static(Point2::new(2.0, 3.0)).unwrap();
    let p = linkage.add_passive(Some(Point2::new(5.0, 5.0))).unwrap();

    assert_eq!(linkage.joint_type(a), Some(JointType::Static));
    assert_eq!(linkage.joint_type(p), Some(JointType::Passive));
    assert_eq!(linkage.joint_type(JointId(5)), None);

    assert_eq!(linkage.coordinate(a), Some(Point2::new(2.0, 3.0)));
    assert_eq!(linkage.coordinate(p), Some(Point2::new(5.0, 5.0)));
    assert!(matches!(linkage.joint(p).unwrap().kind(), JointKind::Passive { hint: Some(_) }));

    let positions = linkage.positions();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[&a], Point2::new(2.0, 3.0));
}

#[test]
fn test_degrees_of_freedom() {
    // Four-bar: two grounds, a crank, and a coupler joint
    let mut four_bar = Linkage::new();
    let g1 = four_bar.add_static(Point2::new(0.0, 0.0)).unwrap();
    let g2 = four_bar.add_static(Point2::new(4.0, 0.0)).unwrap();
    let crank = four_bar.add_motor(g1, 1.0).unwrap();
    let coupler = four_bar.add_passive(None).unwrap();
    four_bar.add_link(crank, coupler, 4.0).unwrap();
    four_bar.add_link(g2, coupler, 3.0).unwrap();
    assert_eq!(four_bar.degrees_of_freedom(), 0);

    // A dangling passive joint is under-constrained
    let loose = four_bar.add_passive(None).unwrap();
    four_bar.add_link(coupler, loose, 1.0).unwrap();
    assert_eq!(four_bar.degrees_of_freedom(), 1);

    // Pinning it to three joints over-constrains it
    four_bar.add_link(g1, loose, 1.0).unwrap();
    four_bar.add_link(g2, loose, 1.0).unwrap();
    assert_eq!(four_bar.degrees_of_freedom(), -1);
}

#[test]
fn test_clone_is_independent() {
    let mut linkage = Linkage::new();
    let a = linkage.add_static(Point2::new(0.0, 0.0)).unwrap();
    let b = linkage.add_passive(None).unwrap();

    let mut copy = linkage.clone();
    let c = copy.add_passive(None).unwrap();
    copy.add_link(a, c, 1.0).unwrap();

    assert_eq!(linkage.len(), 2);
    assert_eq!(copy.len(), 3);
    assert!(linkage.adjacency(a).unwrap().is_empty());
    assert!(linkage.joint(b).is_some());
}
