use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn int_range(from: i64, to: i64) -> Type {
    Type::Integer {
        from: Some(from),
        to: Some(to),
    }
}

fn pattern(source: &str) -> Type {
    Type::Pattern(vec![Regex::new(source).unwrap_or_else(|e| panic!("{e}"))])
}

#[test]
fn test_scalar_instances() {
    assert!(Type::Numeric.is_instance(&Value::Integer(1)));
    assert!(Type::Numeric.is_instance(&Value::Float(1.5)));
    assert!(!Type::Numeric.is_instance(&Value::string("1")));
    assert!(int_range(1, 10).is_instance(&Value::Integer(10)));
    assert!(!int_range(1, 10).is_instance(&Value::Integer(11)));
    assert!(pattern("^web").is_instance(&Value::string("web01")));
    assert!(!pattern("^web").is_instance(&Value::string("db01")));
    assert!(Type::Enum(vec!["a".into(), "b".into()]).is_instance(&Value::string("b")));
}

#[test]
fn test_collection_instances() {
    let ints = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
    assert!(Type::Array(Box::new(Type::INTEGER)).is_instance(&ints));
    assert!(!Type::Array(Box::new(Type::String)).is_instance(&ints));
    assert!(Type::Data.is_instance(&ints));
    assert!(!Type::Data.is_instance(&Value::Default));
    assert!(Type::Iterable.is_instance(&Value::Integer(3)));
    assert!(!Type::Iterable.is_instance(&Value::Integer(-3)));
}

#[test]
fn test_optional_and_not_undef() {
    let optional = Type::Optional(Box::new(Type::String));
    assert!(optional.is_instance(&Value::Undef));
    assert!(optional.is_instance(&Value::string("x")));
    assert!(!optional.is_instance(&Value::Integer(1)));
    assert!(!Type::NotUndef.is_instance(&Value::Undef));
}

#[test]
fn test_assignability() {
    assert!(Type::Any.is_assignable(&Type::Undef));
    assert!(Type::Numeric.is_assignable(&Type::INTEGER));
    assert!(!Type::INTEGER.is_assignable(&Type::Numeric));
    assert!(int_range(0, 100).is_assignable(&int_range(1, 10)));
    assert!(!int_range(1, 10).is_assignable(&int_range(0, 100)));
    assert!(Type::String.is_assignable(&pattern("a")));
    assert!(Type::Scalar.is_assignable(&Type::Regexp));
    assert!(!Type::Data.is_assignable(&Type::Regexp));
    assert!(Type::Numeric.is_assignable(&Type::Variant(vec![Type::INTEGER, Type::Float])));
    assert!(!Type::Numeric.is_assignable(&Type::Variant(vec![Type::INTEGER, Type::String])));
    assert!(Type::Optional(Box::new(Type::String)).is_assignable(&Type::Undef));
    assert!(!Type::NotUndef.is_assignable(&Type::Any));
    assert!(Type::NotUndef.is_assignable(&Type::String));
    assert!(Type::array().is_assignable(&Type::Array(Box::new(Type::String))));
}

#[test]
fn test_type_instances() {
    let numeric = Value::type_value(Type::Numeric);
    assert!(Type::Type(None).is_instance(&numeric));
    assert!(Type::Type(Some(Box::new(Type::Scalar))).is_instance(&numeric));
    assert!(!Type::Type(Some(Box::new(Type::String))).is_instance(&numeric));
}

#[test]
fn test_display() {
    assert_eq!(Type::array().to_string(), "Array");
    assert_eq!(Type::Array(Box::new(Type::INTEGER)).to_string(), "Array[Integer]");
    assert_eq!(
        Type::Integer {
            from: Some(1),
            to: None
        }
        .to_string(),
        "Integer[1, default]"
    );
    assert_eq!(
        Type::Hash(Box::new(Type::String), Box::new(Type::Data)).to_string(),
        "Hash[String, Data]"
    );
    assert_eq!(
        Type::Variant(vec![Type::String, Type::Undef]).to_string(),
        "Variant[String, Undef]"
    );
    assert_eq!(Type::Enum(vec!["a".into()]).to_string(), "Enum['a']");
}

#[test]
fn test_from_name() {
    assert_eq!(Type::from_name("Numeric"), Some(Type::Numeric));
    assert_eq!(Type::from_name("Array"), Some(Type::array()));
    assert_eq!(Type::from_name("Nope"), None);
}

proptest! {
    #[test]
    fn integer_range_assignability_matches_instances(
        a in -50i64..50, b in -50i64..50, c in -50i64..50, d in -50i64..50, n in -60i64..60,
    ) {
        let outer = int_range(a.min(b), a.max(b));
        let inner = int_range(c.min(d), c.max(d));
        if outer.is_assignable(&inner) && inner.is_instance(&Value::Integer(n)) {
            prop_assert!(outer.is_instance(&Value::Integer(n)));
        }
    }

    #[test]
    fn variant_accepts_what_any_member_accepts(n in any::<i64>()) {
        let variant = Type::Variant(vec![Type::String, int_range(0, i64::MAX)]);
        let value = Value::Integer(n);
        prop_assert_eq!(variant.is_instance(&value), n >= 0);
    }
}
