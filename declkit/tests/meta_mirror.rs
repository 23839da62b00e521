//! Behavioural tests for `#[derive(MetaMirror)]`.

use std::collections::HashSet;

use declkit::MetaMirror;
use rstest::rstest;

#[derive(Debug, MetaMirror)]
enum Animal {
    Dog,
    Cat(i32),
    Bird { wings: u8, name: String },
}

#[derive(MetaMirror)]
#[declkit(meta = "Kind")]
enum Token<'a, T> {
    Word(&'a str),
    Value(T),
    End,
}

#[rstest]
#[case::unit(Animal::Dog, AnimalMeta::Dog)]
#[case::tuple(Animal::Cat(9), AnimalMeta::Cat)]
#[case::named(Animal::Bird { wings: 2, name: String::from("kea") }, AnimalMeta::Bird)]
fn meta_matches_the_original_case(#[case] animal: Animal, #[case] expected: AnimalMeta) {
    assert_eq!(animal.meta(), expected);
    assert_eq!(AnimalMeta::new(&animal), expected);
    assert_eq!(AnimalMeta::from(&animal), expected);
    assert_eq!(AnimalMeta::from(animal), expected);
}

#[rstest]
fn companions_are_plain_hashable_values() {
    let kinds: HashSet<AnimalMeta> = [Animal::Cat(1), Animal::Cat(2), Animal::Dog]
        .iter()
        .map(Animal::meta)
        .collect();
    assert_eq!(kinds.len(), 2);
    let copied = AnimalMeta::Dog;
    let again = copied;
    assert_eq!(copied, again);
}

#[rstest]
fn renamed_companion_keeps_generics_on_the_original() {
    let word: Token<'_, u8> = Token::Word("hello");
    assert_eq!(word.meta(), Kind::Word);
    assert_eq!(Kind::from(Token::Value(3_u8)), Kind::Value);
    assert_eq!(Kind::new(&Token::<u8>::End), Kind::End);
}
