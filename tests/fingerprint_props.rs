// tests/fingerprint_props.rs

use proptest::prelude::*;
use stitches::pipeline::{Locator, Params, Resource, TaskDescriptor};

fn task(kind: &str, message: &str, params: Params, inputs: Vec<Resource>) -> TaskDescriptor {
    TaskDescriptor::new(kind, message, params, inputs, vec![], vec![], false, "main.toml", "0")
}

proptest! {
    #[test]
    fn message_and_reference_are_not_identity(message in ".{0,40}", kind in "[a-z]{1,10}") {
        let a = task(&kind, &message, Params::new(), vec![]);
        let b = task(&kind, "", Params::new(), vec![]);
        prop_assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn input_order_is_identity(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        prop_assume!(a != b);
        let ra = Resource::parse(&format!("file/{a}")).unwrap();
        let rb = Resource::parse(&format!("file/{b}")).unwrap();

        let ab = task("work", "", Params::new(), vec![ra.clone(), rb.clone()]);
        let ba = task("work", "", Params::new(), vec![rb, ra]);
        prop_assert_ne!(ab.fingerprint, ba.fingerprint);
    }

    #[test]
    fn file_locators_keep_the_whole_path(path in "[a-z]{1,6}(/[a-z._-]{1,6}){0,4}") {
        let spec = format!("file/{path}");
        let resource = Resource::parse(&spec).unwrap();
        prop_assert_eq!(resource.id(), spec.as_str());
        prop_assert_eq!(resource.locator(), &Locator::File { path: path.clone() });
    }

    #[test]
    fn qualified_map_names_split_right_to_left(
        name in "[a-z]{1,8}",
        db in "(/[a-z]{1,6}){1,3}",
        location in "[a-z]{1,6}",
        mapset in "[a-z]{1,6}",
    ) {
        let spec = format!("raster/{name}@{db}/{location}/{mapset}");
        let resource = Resource::parse(&spec).unwrap();
        let Locator::Map { map, .. } = resource.locator() else {
            panic!("expected a map locator");
        };
        prop_assert_eq!(&map.name, &name);
        prop_assert_eq!(map.mapset.as_deref(), Some(mapset.as_str()));
        prop_assert_eq!(map.location.as_deref(), Some(location.as_str()));
        prop_assert_eq!(map.database.as_deref(), Some(db.as_str()));
    }
}
