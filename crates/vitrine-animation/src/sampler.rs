//! Pure keyframe evaluation: binary search + interpolation

use crate::clip::{AnimationTrack, Interpolation, TrackProperty};
use glam::Quat;

/// Sample a track at `time`.
///
/// Times outside the keyframe range clamp to the first/last value. Rotation
/// tracks interpolate spherically and always return a unit quaternion.
pub fn sample_track(track: &AnimationTrack, time: f64) -> Vec<f32> {
    let width = track.property.width();
    let keyframes = &track.keyframes;

    let Some(first) = keyframes.first() else {
        return rest_value(track.property);
    };
    if time <= first.time {
        return fit(&first.value, width);
    }
    let last = &keyframes[keyframes.len() - 1];
    if time >= last.time {
        return fit(&last.value, width);
    }

    // First keyframe at or after `time`; never 0 here
    let idx = keyframes.partition_point(|kf| kf.time < time);
    let next = &keyframes[idx];
    if next.time == time {
        return fit(&next.value, width);
    }
    let prev = &keyframes[idx - 1];

    let span = next.time - prev.time;
    if span <= 0.0 {
        return fit(&prev.value, width);
    }
    let t = ((time - prev.time) / span) as f32;

    let a = fit(&prev.value, width);
    let b = fit(&next.value, width);
    match track.interpolation {
        Interpolation::Step => a,
        Interpolation::Linear => {
            if track.property == TrackProperty::Rotation {
                quat_slerp(&a, &b, t)
            } else {
                lerp_vec(&a, &b, t)
            }
        }
        Interpolation::CubicSpline => {
            let zero = vec![0.0; width];
            let out_tan = prev
                .out_tangent
                .as_deref()
                .map(|v| fit(v, width))
                .unwrap_or_else(|| zero.clone());
            let in_tan = next
                .in_tangent
                .as_deref()
                .map(|v| fit(v, width))
                .unwrap_or(zero);
            let value = cubic_hermite(&a, &out_tan, &b, &in_tan, span as f32, t);
            if track.property == TrackProperty::Rotation {
                normalize_quat(&value)
            } else {
                value
            }
        }
    }
}

/// Value of an untouched transform property
pub fn rest_value(property: TrackProperty) -> Vec<f32> {
    match property {
        TrackProperty::Translation => vec![0.0; 3],
        TrackProperty::Rotation => vec![0.0, 0.0, 0.0, 1.0],
        TrackProperty::Scale => vec![1.0; 3],
    }
}

/// Component-wise linear interpolation
pub fn lerp_vec(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    a.iter().zip(b).map(|(x, y)| x + (y - x) * t).collect()
}

/// Shortest-path quaternion slerp on `[x, y, z, w]` slices
pub fn quat_slerp(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    let qa = to_quat(a);
    let qb = to_quat(b);
    qa.slerp(qb, t).normalize().to_array().to_vec()
}

/// Cubic Hermite spline; tangents are per second and scaled by `dt`
pub fn cubic_hermite(p0: &[f32], m0: &[f32], p1: &[f32], m1: &[f32], dt: f32, t: f32) -> Vec<f32> {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    (0..p0.len())
        .map(|i| h00 * p0[i] + h10 * (m0[i] * dt) + h01 * p1[i] + h11 * (m1[i] * dt))
        .collect()
}

fn to_quat(v: &[f32]) -> Quat {
    Quat::from_xyzw(v[0], v[1], v[2], v[3]).normalize()
}

fn normalize_quat(v: &[f32]) -> Vec<f32> {
    let q = Quat::from_xyzw(v[0], v[1], v[2], v[3]);
    if q.length_squared() <= f32::EPSILON {
        return vec![0.0, 0.0, 0.0, 1.0];
    }
    q.normalize().to_array().to_vec()
}

/// Pad or truncate a value to `width` floats
fn fit(value: &[f32], width: usize) -> Vec<f32> {
    let mut out: Vec<f32> = value.iter().copied().take(width).collect();
    if width == 4 && out.len() < 4 {
        out.resize(3, 0.0);
        out.push(1.0);
    }
    out.resize(width, 0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Keyframe;

    fn make_track(
        property: TrackProperty,
        interpolation: Interpolation,
        keyframes: Vec<Keyframe>,
    ) -> AnimationTrack {
        AnimationTrack {
            node_name: "Body".into(),
            property,
            interpolation,
            keyframes,
        }
    }

    fn kf(time: f64, value: &[f32]) -> Keyframe {
        Keyframe::new(time, value.to_vec())
    }

    #[test]
    fn sample_empty_track_returns_rest_value() {
        let track = make_track(TrackProperty::Scale, Interpolation::Linear, vec![]);
        assert_eq!(sample_track(&track, 0.5), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn sample_clamps_outside_range() {
        let track = make_track(
            TrackProperty::Translation,
            Interpolation::Linear,
            vec![kf(1.0, &[5.0, 10.0, 15.0]), kf(2.0, &[10.0, 20.0, 30.0])],
        );
        assert_eq!(sample_track(&track, 0.0), vec![5.0, 10.0, 15.0]);
        assert_eq!(sample_track(&track, 9.0), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn sample_linear_midpoint() {
        let track = make_track(
            TrackProperty::Translation,
            Interpolation::Linear,
            vec![kf(0.0, &[0.0, 0.0, 0.0]), kf(2.0, &[10.0, 20.0, 30.0])],
        );
        let v = sample_track(&track, 1.0);
        assert!((v[0] - 5.0).abs() < 1e-5);
        assert!((v[1] - 10.0).abs() < 1e-5);
        assert!((v[2] - 15.0).abs() < 1e-5);
    }

    #[test]
    fn sample_step_holds_previous() {
        let track = make_track(
            TrackProperty::Translation,
            Interpolation::Step,
            vec![kf(0.0, &[1.0, 2.0, 3.0]), kf(1.0, &[4.0, 5.0, 6.0])],
        );
        assert_eq!(sample_track(&track, 0.5), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sample_exact_keyframe_time() {
        let track = make_track(
            TrackProperty::Translation,
            Interpolation::Linear,
            vec![
                kf(0.0, &[0.0, 0.0, 0.0]),
                kf(1.0, &[10.0, 10.0, 10.0]),
                kf(2.0, &[20.0, 20.0, 20.0]),
            ],
        );
        assert_eq!(sample_track(&track, 1.0), vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn rotation_slerps_to_unit_quaternion() {
        let quarter = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let track = make_track(
            TrackProperty::Rotation,
            Interpolation::Linear,
            vec![
                kf(0.0, &[0.0, 0.0, 0.0, 1.0]),
                kf(1.0, &quarter.to_array()),
            ],
        );
        let mid = sample_track(&track, 0.5);
        let q = Quat::from_slice(&mid);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(q.abs_diff_eq(expected, 1e-5));
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn cubic_with_zero_tangents_hits_endpoints() {
        let mut a = kf(0.0, &[0.0, 0.0, 0.0]);
        a.out_tangent = Some(vec![0.0; 3]);
        let mut b = kf(1.0, &[10.0, 10.0, 10.0]);
        b.in_tangent = Some(vec![0.0; 3]);
        let track = make_track(TrackProperty::Translation, Interpolation::CubicSpline, vec![a, b]);
        assert_eq!(sample_track(&track, 0.0), vec![0.0, 0.0, 0.0]);
        assert_eq!(sample_track(&track, 1.0), vec![10.0, 10.0, 10.0]);
        let mid = sample_track(&track, 0.5);
        assert!((mid[0] - 5.0).abs() < 1e-5);
    }
}
