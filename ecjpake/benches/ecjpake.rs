use bencher::{benchmark_group, benchmark_main, Bencher};
use ecjpake::{
    EcJpake, Password, Role, MAX_RESPONDER_PAYLOAD_LEN, MAX_ROUND_ONE_LEN, MAX_ROUND_TWO_LEN,
};
use rand_core::OsRng;

fn ecjpake_setup(bench: &mut Bencher) {
    let password = Password::new(b"password");
    bench.iter(|| EcJpake::new(Role::Initiator, &password).unwrap())
}

fn ecjpake_round_one(bench: &mut Bencher) {
    let password = Password::new(b"password");
    bench.iter(|| {
        let mut initiator = EcJpake::new(Role::Initiator, &password).unwrap();
        let mut e1 = [0u8; MAX_ROUND_ONE_LEN];
        initiator.write_initiator_payload(&mut e1, &mut OsRng).unwrap()
    })
}

fn ecjpake_full_exchange(bench: &mut Bencher) {
    let password = Password::new(b"password");
    bench.iter(|| {
        let mut initiator = EcJpake::new(Role::Initiator, &password).unwrap();
        let mut responder = EcJpake::new(Role::Responder, &password).unwrap();

        let mut e1 = [0u8; MAX_ROUND_ONE_LEN];
        let n = initiator.write_initiator_payload(&mut e1, &mut OsRng).unwrap();
        responder.read_initiator_payload(&e1[..n]).unwrap();
        let mut e2 = [0u8; MAX_RESPONDER_PAYLOAD_LEN];
        let n = responder.write_responder_payload(&mut e2, &mut OsRng).unwrap();
        initiator.read_responder_payload(&e2[..n]).unwrap();
        let mut e3 = [0u8; MAX_ROUND_TWO_LEN];
        let n = initiator.write_initiator_round_two(&mut e3, &mut OsRng).unwrap();
        responder.read_initiator_round_two(&e3[..n]).unwrap();

        (
            initiator.derive_session_key().unwrap(),
            responder.derive_session_key().unwrap(),
        )
    })
}

fn ecjpake_self_test(bench: &mut Bencher) {
    bench.iter(|| ecjpake::self_test().unwrap())
}

benchmark_group!(
    benches,
    ecjpake_setup,
    ecjpake_round_one,
    ecjpake_full_exchange,
    ecjpake_self_test
);
benchmark_main!(benches);
