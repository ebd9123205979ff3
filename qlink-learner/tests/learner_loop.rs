//! End-to-end exchange: a real TCP actor streams experience to the
//! coordinator and picks up snapshots on the episode cadence.

use std::path::PathBuf;

use qlink_core::{Approximator, ExperienceCodec, ExperienceRecord, LearnerConfig, LinearQ};
use qlink_learner::Coordinator;
use qlink_transport::{ActorClient, TcpPeerChannel};

fn record(step: usize, done: bool) -> ExperienceRecord {
    ExperienceRecord {
        state: vec![step as f32, 0.5],
        action: (step % 2) as u32,
        reward: 1.0,
        next_state: vec![step as f32 + 1.0, 0.5],
        done,
    }
}

#[tokio::test]
async fn test_actor_exchange_and_snapshot_cadence() {
    let checkpoint_dir =
        PathBuf::from(std::env::temp_dir()).join(format!("qlink-e2e-{}", std::process::id()));
    let config = LearnerConfig {
        state_size: 2,
        action_size: 2,
        replay_capacity: 64,
        batch_size: 2,
        num_episodes: 2,
        max_steps_per_episode: 8,
        snapshot_cadence: 1,
        bind_addr: "127.0.0.1:0".to_string(),
        checkpoint_dir: checkpoint_dir.clone(),
        ..Default::default()
    };

    let mut channel = TcpPeerChannel::bind(&config.bind_addr).await.unwrap();
    let addr = channel.local_addr().to_string();

    let approximator = LinearQ::new(2, 2, config.gamma, config.learning_rate);
    let mut coordinator = Coordinator::new(config, approximator).await.unwrap();
    let learner = tokio::spawn(async move {
        coordinator.run(&mut channel).await.unwrap();
        coordinator
    });

    let codec = ExperienceCodec::new(2, 2);
    let mut actor = ActorClient::connect(&addr).await.unwrap();

    for _episode in 0..2 {
        for step in 0..3 {
            actor
                .send_experience(&codec, &record(step, step == 2))
                .await
                .unwrap();
        }
        // cadence 1: every completed episode pushes a snapshot
        let snapshot = actor.recv_snapshot().await.unwrap();
        assert!(!snapshot.is_empty());

        let mut replica = LinearQ::new(2, 2, 0.95, 0.001);
        replica.deserialize(&snapshot).await.unwrap();
        let q = replica.predict(&[0.0, 0.5]).await.unwrap();
        assert_eq!(q.len(), 2);
    }

    let coordinator = learner.await.unwrap();
    assert_eq!(coordinator.buffer_len(), 6);

    // Both episodes persisted an episode-indexed snapshot
    assert!(checkpoint_dir.join("snapshot-episode_0.bin.gz").exists());
    assert!(checkpoint_dir.join("snapshot-episode_1.bin.gz").exists());
    let _ = std::fs::remove_dir_all(&checkpoint_dir);
}
