/// A tiny arcade-physics host.
///
/// `ArcadeWorld` implements [`Engine`] with just enough behaviour to play
/// the game in a terminal: axis-aligned bodies, gravity, bouncing off the
/// window edges, landing on platforms, overlap reports, particle emitters
/// and timed animations.  With [`ArcadeWorld::recording`] it also keeps a
/// ledger of emitter attachments and a log of bursts, so tests can check
/// that nothing is leaked.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{
    ActorHandle, Animation, AnimationOptions, Contact, EmitterConfig, EmitterHandle, Engine,
    OnComplete, ParticleTexture, SpriteKey, TextHandle, TextStyle, Tint, Tween, TINT_NONE,
};
use crate::entities::CollisionEvent;

/// Downward acceleration applied to every dynamic body, px/s².
pub const WORLD_GRAVITY: f32 = 300.0;

const EXPLOSION_FRAMES: u32 = 16;
const EXPLOSION_FRAME_RATE: f32 = 20.0;

/// Playback length of a non-looping animation in milliseconds.
pub fn animation_length(animation: Animation) -> Option<f32> {
    match animation {
        Animation::BombExplosion => Some(EXPLOSION_FRAMES as f32 * 1000.0 / EXPLOSION_FRAME_RATE),
        _ => None,
    }
}

/// Unscaled body size of each sprite in pixels.
pub fn sprite_size(key: SpriteKey) -> Vec2 {
    match key {
        SpriteKey::Player => Vec2::new(32.0, 48.0),
        SpriteKey::Platform => Vec2::new(400.0, 32.0),
        SpriteKey::Star => Vec2::new(24.0, 22.0),
        SpriteKey::Bomb => Vec2::new(14.0, 14.0),
        SpriteKey::Heart => Vec2::new(26.0, 22.0),
        SpriteKey::Explosion => Vec2::new(64.0, 64.0),
    }
}

// ── World objects ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub key: SpriteKey,
    /// Centre of the body.
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Extra acceleration on top of [`WORLD_GRAVITY`].
    pub gravity: Vec2,
    pub bounce: f32,
    pub collide_world_bounds: bool,
    pub tint: Tint,
    pub alpha: f32,
    pub visible: bool,
    pub touching_down: bool,
    pub animation: Option<Animation>,
    pub anim_elapsed: f32,
    pub on_complete: Option<OnComplete>,
}

impl Body {
    fn new(key: SpriteKey, pos: Vec2) -> Self {
        Body {
            key,
            pos,
            vel: Vec2::ZERO,
            size: sprite_size(key),
            gravity: Vec2::ZERO,
            bounce: 0.0,
            collide_world_bounds: false,
            tint: TINT_NONE,
            alpha: 1.0,
            visible: true,
            touching_down: false,
            animation: None,
            anim_elapsed: 0.0,
            on_complete: None,
        }
    }

    /// Platforms and effects never move.
    pub fn is_static(&self) -> bool {
        matches!(self.key, SpriteKey::Platform | SpriteKey::Explosion)
    }

    pub fn min(&self) -> Vec2 {
        self.pos - self.size / 2.0
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        let (a0, a1) = (self.min(), self.max());
        let (b0, b1) = (other.min(), other.max());
        a0.x < b1.x && b0.x < a1.x && a0.y < b1.y && b0.y < a1.y
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    pub config: EmitterConfig,
    pub follow: Option<ActorHandle>,
    since_emit: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub lifespan: f32,
    pub fade: Tween,
    pub tint: Option<Tint>,
    pub texture: ParticleTexture,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        let t = (self.age / self.lifespan).clamp(0.0, 1.0);
        self.fade.start + (self.fade.end - self.fade.start) * t
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub pos: Vec2,
    pub text: String,
    pub style: TextStyle,
}

/// One call to [`Engine::burst`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstRecord {
    pub count: u32,
    pub at: Vec2,
    pub tint: Option<Tint>,
    pub texture: ParticleTexture,
}

/// Follow-emitter bookkeeping for one body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitterLedger {
    pub attached: u32,
    pub detached: u32,
}

// ── The world ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ArcadeWorld {
    width: f32,
    height: f32,
    next_id: u32,
    paused: bool,
    bodies: BTreeMap<ActorHandle, Body>,
    emitters: BTreeMap<EmitterHandle, Emitter>,
    particles: Vec<Particle>,
    texts: BTreeMap<TextHandle, Text>,
    watches: Vec<(SpriteKey, SpriteKey, Contact)>,
    pending: Vec<CollisionEvent>,
    record: bool,
    ledger: HashMap<ActorHandle, EmitterLedger>,
    bursts: Vec<BurstRecord>,
    rng: StdRng,
}

impl ArcadeWorld {
    pub fn new(width: f32, height: f32) -> Self {
        ArcadeWorld {
            width,
            height,
            next_id: 1,
            paused: false,
            bodies: BTreeMap::new(),
            emitters: BTreeMap::new(),
            particles: Vec::new(),
            texts: BTreeMap::new(),
            watches: Vec::new(),
            pending: Vec::new(),
            record: false,
            ledger: HashMap::new(),
            bursts: Vec::new(),
            rng: StdRng::seed_from_u64(0x5747_4152),
        }
    }

    /// Keep the emitter ledger and burst log.  Both grow for the whole
    /// session, so only tests turn this on.
    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn body(&self, handle: ActorHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (ActorHandle, &Body)> {
        self.bodies.iter().map(|(h, b)| (*h, b))
    }

    pub fn count(&self, key: SpriteKey) -> usize {
        self.bodies.values().filter(|b| b.key == key).count()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn texts(&self) -> impl Iterator<Item = (TextHandle, &Text)> {
        self.texts.iter().map(|(h, t)| (*h, t))
    }

    pub fn text(&self, handle: TextHandle) -> Option<&str> {
        self.texts.get(&handle).map(|t| t.text.as_str())
    }

    pub fn live_emitters(&self) -> usize {
        self.emitters.len()
    }

    /// Trail configuration of the emitter following `handle`, if any.
    pub fn trail(&self, handle: ActorHandle) -> Option<&EmitterConfig> {
        self.emitters.values().find(|e| e.follow == Some(handle)).map(|e| &e.config)
    }

    /// Emitters still following `handle`.
    pub fn emitters_following(&self, handle: ActorHandle) -> usize {
        self.emitters.values().filter(|e| e.follow == Some(handle)).count()
    }

    pub fn emitter_ledger(&self, handle: ActorHandle) -> EmitterLedger {
        self.ledger.get(&handle).copied().unwrap_or_default()
    }

    pub fn bursts(&self) -> &[BurstRecord] {
        &self.bursts
    }

    /// Queue a contact as if the physics pass had detected it.
    pub fn report(&mut self, event: CollisionEvent) {
        self.pending.push(event);
    }

    pub fn move_to(&mut self, handle: ActorHandle, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = pos;
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ── Simulation ────────────────────────────────────────────────────────────

    /// Advance the world by `delta` milliseconds.
    pub fn step(&mut self, delta: f32) {
        let dt = delta / 1000.0;
        if !self.paused {
            self.integrate(dt);
            self.detect_contacts();
        }
        self.advance_animations(delta);
        self.advance_emitters(delta);
        self.advance_particles(delta, dt);
    }

    fn integrate(&mut self, dt: f32) {
        let platforms: Vec<(Vec2, Vec2)> = self
            .bodies
            .values()
            .filter(|b| b.key == SpriteKey::Platform)
            .map(|b| (b.min(), b.max()))
            .collect();
        let landers: Vec<SpriteKey> = self
            .watches
            .iter()
            .filter(|(_, _, c)| *c == Contact::Collide)
            .filter_map(|&(a, b, _)| match (a, b) {
                (k, SpriteKey::Platform) | (SpriteKey::Platform, k) => Some(k),
                _ => None,
            })
            .collect();
        let (width, height) = (self.width, self.height);

        for body in self.bodies.values_mut().filter(|b| !b.is_static()) {
            body.touching_down = false;
            body.vel += (Vec2::new(0.0, WORLD_GRAVITY) + body.gravity) * dt;
            let half = body.size / 2.0;
            let prev_bottom = body.pos.y + half.y;
            body.pos += body.vel * dt;

            if landers.contains(&body.key) && body.vel.y >= 0.0 {
                for (min, max) in &platforms {
                    let over = body.pos.x + half.x > min.x && body.pos.x - half.x < max.x;
                    if over && prev_bottom <= min.y && body.pos.y + half.y >= min.y {
                        body.pos.y = min.y - half.y;
                        body.vel.y = -body.vel.y * body.bounce;
                        body.touching_down = true;
                        break;
                    }
                }
            }

            if body.collide_world_bounds {
                if body.pos.x - half.x < 0.0 {
                    body.pos.x = half.x;
                    body.vel.x = body.vel.x.abs() * body.bounce;
                } else if body.pos.x + half.x > width {
                    body.pos.x = width - half.x;
                    body.vel.x = -body.vel.x.abs() * body.bounce;
                }
                if body.pos.y - half.y < 0.0 {
                    body.pos.y = half.y;
                    body.vel.y = body.vel.y.abs() * body.bounce;
                } else if body.pos.y + half.y > height {
                    body.pos.y = height - half.y;
                    body.vel.y = -body.vel.y.abs() * body.bounce;
                    body.touching_down = true;
                }
            }
        }
    }

    fn detect_contacts(&mut self) {
        let mut bounced = Vec::new();
        for &(a, b, contact) in &self.watches {
            if a == SpriteKey::Platform || b == SpriteKey::Platform {
                continue;
            }
            for (&ha, ba) in self.bodies.iter().filter(|(_, body)| body.key == a) {
                for (&hb, bb) in self.bodies.iter().filter(|(_, body)| body.key == b) {
                    if ha == hb || !ba.overlaps(bb) {
                        continue;
                    }
                    self.pending.push(CollisionEvent {
                        kind_a: a,
                        handle_a: ha,
                        kind_b: b,
                        handle_b: hb,
                    });
                    // Collide also pushes the second body away if it is
                    // still heading into the first.
                    if contact == Contact::Collide && bb.vel.dot(ba.pos - bb.pos) > 0.0 {
                        bounced.push(hb);
                    }
                }
            }
        }
        for handle in bounced {
            if let Some(body) = self.bodies.get_mut(&handle) {
                body.vel = -body.vel * body.bounce;
            }
        }
    }

    fn advance_animations(&mut self, delta: f32) {
        let mut finished = Vec::new();
        for (handle, body) in self.bodies.iter_mut() {
            let Some(animation) = body.animation else {
                continue;
            };
            body.anim_elapsed += delta;
            match animation_length(animation) {
                Some(length) if body.anim_elapsed >= length => {
                    body.visible = false;
                    body.animation = None;
                    if body.on_complete == Some(OnComplete::Destroy) {
                        finished.push(*handle);
                    }
                }
                _ => {}
            }
        }
        for handle in finished {
            self.bodies.remove(&handle);
        }
    }

    fn advance_emitters(&mut self, delta: f32) {
        for emitter in self.emitters.values_mut() {
            let (Some(every), Some(follow)) = (emitter.config.frequency, emitter.follow) else {
                continue;
            };
            let Some(body) = self.bodies.get(&follow) else {
                continue;
            };
            emitter.since_emit += delta;
            while emitter.since_emit >= every {
                emitter.since_emit -= every;
                let particle = spawn_particle(&mut self.rng, &emitter.config, body.pos);
                self.particles.push(particle);
            }
        }
    }

    fn advance_particles(&mut self, delta: f32, dt: f32) {
        for p in self.particles.iter_mut() {
            p.age += delta;
            p.pos += p.vel * dt;
        }
        self.particles.retain(|p| p.age < p.lifespan);
    }
}

fn sample(rng: &mut StdRng, tween: Tween) -> f32 {
    let (lo, hi) = (tween.start.min(tween.end), tween.start.max(tween.end));
    rng.gen_range(lo..=hi)
}

fn spawn_particle(rng: &mut StdRng, config: &EmitterConfig, at: Vec2) -> Particle {
    let angle = sample(rng, config.angle).to_radians();
    Particle {
        pos: at,
        vel: Vec2::from_angle(angle) * config.speed,
        age: 0.0,
        lifespan: config.lifespan,
        fade: config.alpha,
        tint: config.tint,
        texture: config.texture,
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

impl Engine for ArcadeWorld {
    fn create(&mut self, key: SpriteKey, pos: Vec2) -> ActorHandle {
        let handle = ActorHandle(self.next_id());
        self.bodies.insert(handle, Body::new(key, pos));
        handle
    }

    fn destroy(&mut self, handle: ActorHandle) {
        self.bodies.remove(&handle);
    }

    fn position(&self, handle: ActorHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    fn velocity(&self, handle: ActorHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.vel)
    }

    fn is_touching_down(&self, handle: ActorHandle) -> bool {
        self.bodies.get(&handle).is_some_and(|b| b.touching_down)
    }

    fn set_scale(&mut self, handle: ActorHandle, scale: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.size = sprite_size(body.key) * scale;
        }
    }

    fn set_velocity(&mut self, handle: ActorHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.vel = velocity;
        }
    }

    fn set_bounce(&mut self, handle: ActorHandle, coeff: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.bounce = coeff;
        }
    }

    fn set_collide_world_bounds(&mut self, handle: ActorHandle, on: bool) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.collide_world_bounds = on;
        }
    }

    fn set_gravity(&mut self, handle: ActorHandle, gravity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.gravity = gravity;
        }
    }

    fn set_tint(&mut self, handle: ActorHandle, tint: Tint) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.tint = tint;
        }
    }

    fn tint(&self, handle: ActorHandle) -> Tint {
        self.bodies.get(&handle).map_or(TINT_NONE, |b| b.tint)
    }

    fn set_alpha(&mut self, handle: ActorHandle, alpha: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.alpha = alpha;
        }
    }

    fn play_animation(
        &mut self,
        handle: ActorHandle,
        animation: Animation,
        opts: AnimationOptions,
    ) {
        let Some(body) = self.bodies.get_mut(&handle) else {
            return;
        };
        if opts.ignore_if_playing && body.animation == Some(animation) {
            return;
        }
        body.animation = Some(animation);
        body.anim_elapsed = 0.0;
        body.visible = true;
    }

    fn on_animation_complete(&mut self, handle: ActorHandle, action: OnComplete) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.on_complete = Some(action);
        }
    }

    fn create_emitter(&mut self, config: EmitterConfig) -> EmitterHandle {
        let handle = EmitterHandle(self.next_id());
        self.emitters.insert(handle, Emitter { config, follow: None, since_emit: 0.0 });
        handle
    }

    fn attach_follow(&mut self, emitter: EmitterHandle, handle: ActorHandle) {
        if let Some(e) = self.emitters.get_mut(&emitter) {
            e.follow = Some(handle);
            if self.record {
                self.ledger.entry(handle).or_default().attached += 1;
            }
        }
    }

    fn detach(&mut self, emitter: EmitterHandle) {
        let released = self.emitters.remove(&emitter);
        if let (true, Some(Emitter { follow: Some(handle), .. })) = (self.record, released) {
            self.ledger.entry(handle).or_default().detached += 1;
        }
    }

    fn burst(&mut self, emitter: EmitterHandle, count: u32, at: Vec2) {
        let Some(config) = self.emitters.get(&emitter).map(|e| e.config) else {
            return;
        };
        for _ in 0..count {
            let particle = spawn_particle(&mut self.rng, &config, at);
            self.particles.push(particle);
        }
        if self.record {
            let record = BurstRecord { count, at, tint: config.tint, texture: config.texture };
            self.bursts.push(record);
        }
        if config.frequency.is_none() {
            self.emitters.remove(&emitter);
        }
    }

    fn watch(&mut self, a: SpriteKey, b: SpriteKey, contact: Contact) {
        if !self.watches.contains(&(a, b, contact)) {
            self.watches.push((a, b, contact));
        }
    }

    fn poll_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.pending)
    }

    fn add_text(&mut self, pos: Vec2, text: &str, style: TextStyle) -> TextHandle {
        let handle = TextHandle(self.next_id());
        self.texts.insert(handle, Text { pos, text: text.to_string(), style });
        handle
    }

    fn set_text(&mut self, handle: TextHandle, text: &str) {
        if let Some(t) = self.texts.get_mut(&handle) {
            t.text = text.to_string();
        }
    }

    fn remove_text(&mut self, handle: TextHandle) {
        self.texts.remove(&handle);
    }

    fn pause_physics(&mut self) {
        self.paused = true;
    }
}
